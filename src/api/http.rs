//! reqwest client for the matka REST backend.
//!
//! Base URL: configurable, e.g. `https://backend.example.com/api`
//! Auth: `Authorization: Bearer {token}` on wallet, bet and result calls.
//! No request timeout unless one is configured.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

use super::{
    decode_each, MarketIdResponse, MatkaBackend, PlaceBetRequest, PlaceBetResponse, ResultEntry,
    UserBet, UserBetsResponse, WalletResponse,
};
use crate::types::MatkaError;

const USER_AGENT: &str = "matka/0.1.0";

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP implementation of `MatkaBackend`.
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client against `base_url` (trailing slashes are ignored).
    ///
    /// `timeout` is `None` for no per-request limit.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder
            .build()
            .context("Failed to build HTTP client for matka backend")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, req: RequestBuilder, token: &str) -> RequestBuilder {
        req.bearer_auth(token)
    }

    /// Send, check status, decode JSON.
    async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T> {
        let resp = req
            .send()
            .await
            .with_context(|| format!("{what} request failed"))?;

        let resp = Self::check_status(resp, what).await?;

        resp.json::<T>()
            .await
            .with_context(|| format!("Failed to parse {what} response"))
    }

    async fn check_status(resp: Response, what: &str) -> Result<Response> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(MatkaError::NotAuthenticated(format!("{what} rejected with {status}")).into());
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("{what} failed {status}: {body}");
        }
        Ok(resp)
    }
}

// ---------------------------------------------------------------------------
// MatkaBackend trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl MatkaBackend for HttpBackend {
    async fn wallet_balance(&self, token: &str) -> Result<i64> {
        let req = self.authed(self.http.get(self.url("/wallet/balance")), token);
        let wallet: WalletResponse = self.fetch(req, "Wallet balance").await?;
        debug!(balance = wallet.wallet_balance, "Wallet balance fetched");
        Ok(wallet.wallet_balance)
    }

    async fn user_bets(&self, token: &str) -> Result<Vec<UserBet>> {
        let req = self.authed(self.http.get(self.url("/bets/user/")), token);
        let resp: UserBetsResponse = self.fetch(req, "User bets").await?;
        let received = resp.bets.len();
        let bets: Vec<UserBet> = decode_each(resp.bets, "bet");
        debug!(received, kept = bets.len(), "User bets fetched");
        Ok(bets)
    }

    async fn place_bet(&self, token: &str, request: &PlaceBetRequest) -> Result<PlaceBetResponse> {
        let req = self
            .authed(self.http.post(self.url("/bets/place")), token)
            .json(request);

        let resp = req.send().await.context("Place bet request failed")?;
        let resp = Self::check_status(resp, "Place bet").await?;

        // An empty body is a valid acknowledgement.
        let text = resp.text().await.context("Failed to read place bet response")?;
        let placed: PlaceBetResponse = if text.trim().is_empty() {
            PlaceBetResponse::default()
        } else {
            serde_json::from_str(&text).context("Failed to parse place bet response")?
        };

        info!(
            market = %request.market_name,
            game = %request.game_name,
            number = %request.number,
            amount = request.amount,
            bet_type = %request.bet_type,
            status = ?placed.status,
            "Bet placed"
        );
        Ok(placed)
    }

    async fn market_id(&self, market_name: &str) -> Result<String> {
        let url = self.url(&format!(
            "/markets/get-market-id/{}",
            urlencoding::encode(market_name)
        ));
        debug!(url = %url, "Resolving market id");
        let resp: MarketIdResponse = self.fetch(self.http.get(&url), "Market id").await?;
        Ok(resp.market_id)
    }

    async fn market_results(&self, token: &str, market_id: &str) -> Result<Vec<ResultEntry>> {
        let url = self.url(&format!(
            "/markets/get-results/{}",
            urlencoding::encode(market_id)
        ));
        let req = self.authed(self.http.get(&url), token);
        let rows: Vec<serde_json::Value> = self.fetch(req, "Market results").await?;
        let received = rows.len();
        let entries: Vec<ResultEntry> = decode_each(rows, "market result");
        debug!(market_id, received, kept = entries.len(), "Market results fetched");
        Ok(entries)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
