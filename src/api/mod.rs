//! Backend integration.
//!
//! Defines the `MatkaBackend` trait over the REST contract and provides
//! the reqwest-backed `HttpBackend`. Engines only talk to the trait, so
//! tests swap in an in-memory backend.

pub mod http;

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::types::Session;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// `GET /wallet/balance`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    pub wallet_balance: i64,
}

/// `GET /bets/user/`. Items are kept raw and decoded one by one.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UserBetsResponse {
    #[serde(default)]
    pub bets: Vec<serde_json::Value>,
}

/// A bet as the backend stores it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserBet {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub game_name: String,
    #[serde(default)]
    pub market_name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub number: String,
    /// Sent as a string by older clients, so accept both.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub amount: u64,
    #[serde(default)]
    pub bet_type: Option<String>,
}

/// `POST /bets/place` body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBetRequest {
    pub market_name: String,
    pub game_name: String,
    pub number: String,
    pub amount: u64,
    pub winning_ratio: u32,
    pub bet_type: Session,
}

/// `POST /bets/place` response. Every field is optional.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct PlaceBetResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
}

/// `GET /markets/get-market-id/:marketName`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketIdResponse {
    pub market_id: String,
}

/// One day of `GET /markets/get-results/:marketId`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResultEntry {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub open_number: Option<String>,
    #[serde(default)]
    pub close_number: Option<String>,
    #[serde(default)]
    pub jodi_result: Option<String>,
}

/// Decode each record on its own. Malformed records are logged and dropped.
pub fn decode_each<T: DeserializeOwned>(items: Vec<serde_json::Value>, what: &str) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<T>(item) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(what, index, error = %e, "Dropping malformed record");
                None
            }
        })
        .collect()
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .ok_or_else(|| D::Error::custom(format!("invalid amount: {n}"))),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| D::Error::custom(format!("invalid amount: {s}"))),
        serde_json::Value::Null => Ok(0),
        other => Err(D::Error::custom(format!("invalid amount: {other}"))),
    }
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// Abstraction over the matka REST backend.
///
/// Authenticated calls take the bearer token explicitly; the engines
/// decide whether one is available before calling.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatkaBackend: Send + Sync {
    /// Current wallet balance in coins.
    async fn wallet_balance(&self, token: &str) -> Result<i64>;

    /// Every bet the user has placed, across games and markets.
    async fn user_bets(&self, token: &str) -> Result<Vec<UserBet>>;

    /// Place a single bet.
    async fn place_bet(&self, token: &str, request: &PlaceBetRequest) -> Result<PlaceBetResponse>;

    /// Look up a market's id by its display name.
    async fn market_id(&self, market_name: &str) -> Result<String>;

    /// Historical daily results for a market, in no particular order.
    async fn market_results(&self, token: &str, market_id: &str) -> Result<Vec<ResultEntry>>;
}
