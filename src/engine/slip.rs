//! Bet slip engine.
//!
//! Holds the pending wagers for one game screen on one market, the ledger
//! of placed bets, and the cached wallet balance. Submission fires every
//! pending wager concurrently and commits only if all of them succeed.

use futures::future::join_all;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::api::{MatkaBackend, PlaceBetRequest, UserBet};
use crate::auth::CredentialProvider;
use crate::engine::wager::{validate, WagerDraft};
use crate::types::{
    BetStatus, GameSpec, MatkaError, PlacedBet, Session, ValidationError, Wager, WagerId,
};

const MSG_LOGIN_TO_VIEW: &str = "You need to log in to see your balance and bets.";
const MSG_LOGIN_TO_PLACE: &str = "You need to log in to place bets.";
const MSG_FETCH_FAILED: &str = "Failed to fetch data!";
const MSG_SUBMIT_FAILED: &str = "Failed submitting!";

/// Confirmation returned by a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub placed: usize,
    pub total_points: u64,
    pub balance_after: u64,
}

/// Bet slip for a single game on a single market.
pub struct BetSlip {
    backend: Arc<dyn MatkaBackend>,
    credentials: Arc<dyn CredentialProvider>,
    market_name: String,
    game: GameSpec,
    session: Session,
    pending: Vec<Wager>,
    ledger: Vec<PlacedBet>,
    balance: u64,
    last_error: Option<String>,
}

impl BetSlip {
    pub fn new(
        backend: Arc<dyn MatkaBackend>,
        credentials: Arc<dyn CredentialProvider>,
        market_name: &str,
        game: GameSpec,
    ) -> Self {
        Self {
            backend,
            credentials,
            market_name: market_name.to_string(),
            game,
            session: Session::Open,
            pending: Vec::new(),
            ledger: Vec::new(),
            balance: 0,
            last_error: None,
        }
    }

    // -- Accessors -------------------------------------------------------

    pub fn market_name(&self) -> &str {
        &self.market_name
    }

    pub fn game(&self) -> GameSpec {
        self.game
    }

    pub fn pending(&self) -> &[Wager] {
        &self.pending
    }

    pub fn ledger(&self) -> &[PlacedBet] {
        &self.ledger
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn selected_session(&self) -> Session {
        self.session
    }

    /// The Open/Close toggle.
    pub fn select_session(&mut self, session: Session) {
        self.session = session;
    }

    /// Sum of pending stakes, or `None` if it does not fit in a `u64`.
    pub fn total_points(&self) -> Option<u64> {
        self.pending
            .iter()
            .try_fold(0u64, |acc, w| acc.checked_add(w.points))
    }

    fn token(&self) -> Option<SecretString> {
        self.credentials.bearer_token()
    }

    fn fail(&mut self, err: MatkaError, message: &str) -> MatkaError {
        self.last_error = Some(message.to_string());
        err
    }

    // -- Page load -------------------------------------------------------

    /// Refresh the wallet balance and this screen's pending bets.
    ///
    /// Both requests run concurrently; state changes only if both succeed.
    pub async fn load(&mut self) -> Result<(), MatkaError> {
        let Some(token) = self.token() else {
            return Err(self.fail(
                MatkaError::NotAuthenticated("no bearer token".into()),
                MSG_LOGIN_TO_VIEW,
            ));
        };
        let token = token.expose_secret();

        let fetched = futures::try_join!(
            self.backend.wallet_balance(token),
            self.backend.user_bets(token),
        );

        let (balance, bets) = match fetched {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, market = %self.market_name, "Error fetching wallet and bets");
                let err = classify(&e);
                return Err(self.fail(err, MSG_FETCH_FAILED));
            }
        };

        if balance < 0 {
            warn!(balance, "Backend reported a negative wallet balance, treating as 0");
        }
        self.balance = balance.max(0) as u64;

        let game_name = self.game.kind.name();
        self.ledger = bets
            .into_iter()
            .filter(|b| {
                b.game_name == game_name
                    && b.market_name == self.market_name
                    && b.status
                        .as_deref()
                        .is_some_and(|s| s.eq_ignore_ascii_case("pending"))
            })
            .map(|b| self.ledger_entry(b))
            .collect();
        self.last_error = None;

        info!(
            market = %self.market_name,
            game = game_name,
            balance = self.balance,
            pending_bets = self.ledger.len(),
            "Bet slip loaded"
        );
        Ok(())
    }

    fn ledger_entry(&self, bet: UserBet) -> PlacedBet {
        let session = bet
            .bet_type
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or_default();
        PlacedBet {
            server_id: bet.id,
            wager_id: None,
            market_name: bet.market_name,
            game_name: bet.game_name,
            number: bet.number,
            points: bet.amount,
            session,
            status: BetStatus::from_server(bet.status.as_deref()),
        }
    }

    // -- Slip editing ----------------------------------------------------

    /// Validate `draft` and append it to the slip. Clears the draft on success.
    pub fn add_wager(&mut self, draft: &mut WagerDraft, session: Session) -> Result<WagerId, MatkaError> {
        let (number, points) = match validate(self.game.kind, draft) {
            Ok(v) => v,
            Err(v) => {
                debug!(code = v.code(), "Wager rejected");
                let msg = v.user_message();
                return Err(self.fail(v.into(), &msg));
            }
        };

        if self.total_points().and_then(|t| t.checked_add(points)).is_none() {
            let v = ValidationError::PointsOverflow { max: u64::MAX };
            warn!(points, "Wager would overflow the slip total");
            let msg = v.user_message();
            return Err(self.fail(v.into(), &msg));
        }

        let wager = Wager::new(number, points, session);
        let id = wager.id;
        debug!(wager = %wager, id = %id, "Wager added");
        self.pending.push(wager);

        draft.clear();
        self.last_error = None;
        Ok(id)
    }

    /// Remove a pending wager. Unknown ids are ignored.
    pub fn delete_wager(&mut self, id: WagerId) {
        let before = self.pending.len();
        self.pending.retain(|w| w.id != id || w.placed);
        if self.pending.len() < before {
            debug!(id = %id, "Wager removed");
        }
    }

    // -- Submission ------------------------------------------------------

    /// Submit every pending wager.
    ///
    /// All requests are in flight at once. Local state is touched only after
    /// every one has completed, and only if every one succeeded.
    pub async fn submit_slip(&mut self) -> Result<SubmitReceipt, MatkaError> {
        let Some(total) = self.total_points() else {
            let v = ValidationError::PointsOverflow { max: u64::MAX };
            let msg = v.user_message();
            return Err(self.fail(v.into(), &msg));
        };
        if total == 0 {
            let v = ValidationError::EmptySlip;
            let msg = v.user_message();
            return Err(self.fail(v.into(), &msg));
        }
        if total > self.balance {
            let v = ValidationError::InsufficientBalance {
                needed: total,
                available: self.balance,
            };
            let msg = v.user_message();
            return Err(self.fail(v.into(), &msg));
        }
        let Some(token) = self.token() else {
            return Err(self.fail(
                MatkaError::NotAuthenticated("no bearer token".into()),
                MSG_LOGIN_TO_PLACE,
            ));
        };
        let token = token.expose_secret();

        let requests: Vec<PlaceBetRequest> = self
            .pending
            .iter()
            .map(|w| PlaceBetRequest {
                market_name: self.market_name.clone(),
                game_name: self.game.kind.name().to_string(),
                number: w.display_number.clone(),
                amount: w.points,
                winning_ratio: self.game.winning_ratio,
                bet_type: w.session,
            })
            .collect();

        info!(
            market = %self.market_name,
            game = %self.game.kind,
            wagers = requests.len(),
            total_points = total,
            "Submitting bet slip"
        );

        let backend = &self.backend;
        let outcomes = join_all(requests.iter().map(|r| backend.place_bet(token, r))).await;

        let mut responses = Vec::with_capacity(outcomes.len());
        let mut failures = 0usize;
        for (req, outcome) in requests.iter().zip(outcomes) {
            match outcome {
                Ok(resp) => responses.push(resp),
                Err(e) => {
                    failures += 1;
                    warn!(number = %req.number, amount = req.amount, error = %e, "Bet submission failed");
                }
            }
        }

        if failures > 0 {
            error!(
                failed = failures,
                total = requests.len(),
                "Bet slip rejected, nothing committed"
            );
            return Err(self.fail(
                MatkaError::Network(format!("{failures} of {} bets failed", requests.len())),
                MSG_SUBMIT_FAILED,
            ));
        }

        let placed = self.pending.len();
        for (mut wager, resp) in std::mem::take(&mut self.pending).into_iter().zip(responses) {
            wager.placed = true;
            let status = BetStatus::from_server(resp.status.as_deref());
            self.ledger.push(PlacedBet::from_wager(
                &wager,
                &self.market_name,
                self.game.kind,
                resp.id,
                status,
            ));
        }
        self.balance -= total;
        self.last_error = None;

        info!(
            placed,
            total_points = total,
            balance = self.balance,
            "Submitted successfully"
        );

        Ok(SubmitReceipt {
            placed,
            total_points: total,
            balance_after: self.balance,
        })
    }
}

/// Map a backend failure onto the error taxonomy.
pub(crate) fn classify(err: &anyhow::Error) -> MatkaError {
    match err.downcast_ref::<MatkaError>() {
        Some(MatkaError::NotAuthenticated(msg)) => MatkaError::NotAuthenticated(msg.clone()),
        _ => MatkaError::Network(format!("{err:#}")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
