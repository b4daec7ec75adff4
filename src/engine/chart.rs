//! Market chart loader.
//!
//! Resolves a market name to its id, then fetches and aggregates that
//! market's historical results. The two steps run in sequence; the second
//! never starts without an id.

use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::api::MatkaBackend;
use crate::auth::CredentialProvider;
use crate::engine::weekly::{aggregate, WeeklyChart};

/// What happened on a results load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Results fetched; holds the number of weeks.
    Loaded(usize),
    /// No market id yet, so nothing was fetched.
    NoMarket,
    /// No credential. The caller should send the user to log in.
    LoginRequired,
    /// The fetch failed and was logged. Previous results are kept.
    Failed,
}

/// Weekly result chart for one market.
pub struct MarketChart {
    backend: Arc<dyn MatkaBackend>,
    credentials: Arc<dyn CredentialProvider>,
    market_name: String,
    market_id: Option<String>,
    chart: WeeklyChart,
}

impl MarketChart {
    pub fn new(
        backend: Arc<dyn MatkaBackend>,
        credentials: Arc<dyn CredentialProvider>,
        market_name: &str,
    ) -> Self {
        Self {
            backend,
            credentials,
            market_name: market_name.trim().to_string(),
            market_id: None,
            chart: WeeklyChart::default(),
        }
    }

    pub fn market_name(&self) -> &str {
        &self.market_name
    }

    pub fn market_id(&self) -> Option<&str> {
        self.market_id.as_deref()
    }

    pub fn chart(&self) -> &WeeklyChart {
        &self.chart
    }

    /// Look up the market id. Failures are logged and leave the id unset.
    pub async fn resolve_market_id(&mut self) -> Option<&str> {
        if self.market_name.is_empty() {
            return None;
        }

        match self.backend.market_id(&self.market_name).await {
            Ok(id) => {
                info!(market = %self.market_name, market_id = %id, "Market id resolved");
                self.market_id = Some(id);
            }
            Err(e) => {
                error!(market = %self.market_name, error = %e, "Error fetching market id");
            }
        }
        self.market_id.as_deref()
    }

    /// Fetch and aggregate results for the resolved market.
    pub async fn load_results(&mut self) -> LoadOutcome {
        let Some(market_id) = self.market_id.as_deref() else {
            return LoadOutcome::NoMarket;
        };
        let Some(token) = self.credentials.bearer_token() else {
            warn!(market = %self.market_name, "No credential for market results");
            return LoadOutcome::LoginRequired;
        };

        match self
            .backend
            .market_results(token.expose_secret(), market_id)
            .await
        {
            Ok(entries) => {
                self.chart = aggregate(&entries);
                info!(
                    market = %self.market_name,
                    entries = entries.len(),
                    weeks = self.chart.weeks.len(),
                    skipped = self.chart.skipped,
                    "Market results loaded"
                );
                LoadOutcome::Loaded(self.chart.weeks.len())
            }
            Err(e) => {
                error!(market = %self.market_name, error = %e, "Error fetching market results");
                LoadOutcome::Failed
            }
        }
    }

    /// Resolve the id if needed, then load results.
    pub async fn refresh(&mut self) -> LoadOutcome {
        if self.market_id.is_none() {
            self.resolve_market_id().await;
        }
        self.load_results().await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
