//! Mock backend for integration testing.
//!
//! Provides a deterministic `MatkaBackend` implementation that keeps a
//! wallet, a bet book and per-market results in memory, with no
//! external dependencies.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use matka::api::{MatkaBackend, PlaceBetRequest, PlaceBetResponse, ResultEntry, UserBet};

/// An in-memory matka backend.
///
/// Wallet, bets and results are fully controllable from test code.
pub struct MockBackend {
    token: String,
    balance: Arc<Mutex<i64>>,
    bets: Arc<Mutex<Vec<UserBet>>>,
    markets: HashMap<String, String>,
    results: HashMap<String, Vec<ResultEntry>>,
    /// Place-bet calls with a number in this set fail.
    reject_numbers: Arc<Mutex<Vec<String>>>,
    /// Status reported back on a successful place.
    reported_status: Option<String>,
    /// Calls currently inside `place_bet`, and the most seen at once.
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    /// If set, all operations will return this error.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockBackend {
    pub fn new(token: &str, balance: i64) -> Self {
        Self {
            token: token.to_string(),
            balance: Arc::new(Mutex::new(balance)),
            bets: Arc::new(Mutex::new(Vec::new())),
            markets: HashMap::new(),
            results: HashMap::new(),
            reject_numbers: Arc::new(Mutex::new(Vec::new())),
            reported_status: None,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_market(mut self, name: &str, id: &str, results: Vec<ResultEntry>) -> Self {
        self.markets.insert(name.to_string(), id.to_string());
        self.results.insert(id.to_string(), results);
        self
    }

    pub fn with_bet(self, bet: UserBet) -> Self {
        self.bets.lock().unwrap().push(bet);
        self
    }

    pub fn reporting_status(mut self, status: &str) -> Self {
        self.reported_status = Some(status.to_string());
        self
    }

    /// Make every `place_bet` for `number` fail.
    pub fn reject_number(&self, number: &str) {
        self.reject_numbers.lock().unwrap().push(number.to_string());
    }

    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    pub fn server_balance(&self) -> i64 {
        *self.balance.lock().unwrap()
    }

    pub fn placed(&self) -> Vec<UserBet> {
        self.bets.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn check(&self, token: &str) -> Result<()> {
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        if token != self.token {
            return Err(matka::types::MatkaError::NotAuthenticated("bad token".into()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl MatkaBackend for MockBackend {
    async fn wallet_balance(&self, token: &str) -> Result<i64> {
        self.check(token)?;
        Ok(self.server_balance())
    }

    async fn user_bets(&self, token: &str) -> Result<Vec<UserBet>> {
        self.check(token)?;
        Ok(self.placed())
    }

    async fn place_bet(&self, token: &str, request: &PlaceBetRequest) -> Result<PlaceBetResponse> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        // Let the other submissions start before this one finishes.
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.check(token)?;
        if self.reject_numbers.lock().unwrap().contains(&request.number) {
            return Err(anyhow!("Bet rejected: {}", request.number));
        }

        let id = format!("MOCK-{}", Uuid::new_v4());
        *self.balance.lock().unwrap() -= request.amount as i64;
        self.bets.lock().unwrap().push(UserBet {
            id: Some(id.clone()),
            game_name: request.game_name.clone(),
            market_name: request.market_name.clone(),
            status: Some("pending".into()),
            number: request.number.clone(),
            amount: request.amount,
            bet_type: Some(request.bet_type.to_string()),
        });

        Ok(PlaceBetResponse {
            status: self.reported_status.clone(),
            id: Some(id),
        })
    }

    async fn market_id(&self, market_name: &str) -> Result<String> {
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        self.markets
            .get(market_name)
            .cloned()
            .ok_or_else(|| anyhow!("Market not found: {market_name}"))
    }

    async fn market_results(&self, token: &str, market_id: &str) -> Result<Vec<ResultEntry>> {
        self.check(token)?;
        Ok(self.results.get(market_id).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_mock_rejects_wrong_token() {
    let backend = MockBackend::new("good", 100);
    assert!(backend.wallet_balance("bad").await.is_err());
    assert_eq!(backend.wallet_balance("good").await.unwrap(), 100);
}

#[tokio::test]
async fn test_mock_forced_error() {
    let backend = MockBackend::new("t", 100);
    backend.set_error("simulated outage");
    assert!(backend.user_bets("t").await.is_err());
    backend.clear_error();
    assert!(backend.user_bets("t").await.is_ok());
}
