//! Shared types for the matka client.
//!
//! These types form the data model used by both engines. The bet slip
//! and the weekly chart never share state, only these definitions.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Which half of the day's draw a wager targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Session {
    #[default]
    Open,
    Close,
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Session::Open => write!(f, "Open"),
            Session::Close => write!(f, "Close"),
        }
    }
}

impl FromStr for Session {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Session::Open),
            "close" => Ok(Session::Close),
            other => Err(format!("unknown session: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Bet status
// ---------------------------------------------------------------------------

/// Settlement state of a placed bet. Only the backend moves it off `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BetStatus {
    #[default]
    Pending,
    Win,
    Lose,
}

impl BetStatus {
    /// Map a backend status string. Unknown or missing values are `Pending`.
    pub fn from_server(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("win") | Some("won") => BetStatus::Win,
            Some("lose") | Some("lost") | Some("loss") => BetStatus::Lose,
            _ => BetStatus::Pending,
        }
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetStatus::Pending => write!(f, "Pending"),
            BetStatus::Win => write!(f, "Win"),
            BetStatus::Lose => write!(f, "Lose"),
        }
    }
}

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

/// Shape of the number a game accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberShape {
    /// A single digit 0-9.
    Ank,
    /// Exactly three digits.
    Pana,
    /// An Ank and a Pana entered separately, joined for display.
    AnkPana,
}

/// Game screens the slip can be opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
    SingleAnk,
    TriplePana,
    HalfSangam,
}

impl GameKind {
    pub const ALL: [GameKind; 3] = [GameKind::SingleAnk, GameKind::TriplePana, GameKind::HalfSangam];

    /// The `gameName` the backend files bets under.
    pub fn name(&self) -> &'static str {
        match self {
            GameKind::SingleAnk => "Single Ank",
            GameKind::TriplePana => "Triple Pana",
            GameKind::HalfSangam => "Half Sangam",
        }
    }

    pub fn shape(&self) -> NumberShape {
        match self {
            GameKind::SingleAnk => NumberShape::Ank,
            GameKind::TriplePana => NumberShape::Pana,
            GameKind::HalfSangam => NumberShape::AnkPana,
        }
    }

    /// Fixed payout ratio sent with every bet unless configured otherwise.
    pub fn default_winning_ratio(&self) -> u32 {
        match self {
            GameKind::SingleAnk => 9,
            GameKind::TriplePana => 9,
            GameKind::HalfSangam => 18,
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for GameKind {
    type Err = String;

    /// Accepts the backend name ("Half Sangam") or a slug ("half-sangam").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        GameKind::ALL
            .into_iter()
            .find(|g| {
                g.name()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .map(|c| c.to_ascii_lowercase())
                    .eq(norm.chars())
            })
            .ok_or_else(|| format!("unknown game: {s}"))
    }
}

/// A game screen as configured: which game and what it pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSpec {
    pub kind: GameKind,
    pub winning_ratio: u32,
}

impl GameSpec {
    pub fn new(kind: GameKind) -> Self {
        Self {
            kind,
            winning_ratio: kind.default_winning_ratio(),
        }
    }

    pub fn with_ratio(kind: GameKind, winning_ratio: u32) -> Self {
        Self { kind, winning_ratio }
    }
}

// ---------------------------------------------------------------------------
// Wagers
// ---------------------------------------------------------------------------

/// Client-side wager identifier, unique within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WagerId(Uuid);

impl WagerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WagerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The validated number a wager is placed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WagerNumber {
    Ank(String),
    Pana(String),
    AnkPana { ank: String, pana: String },
}

impl WagerNumber {
    /// Number as shown to the user and sent to the backend.
    ///
    /// Composite numbers read Pana-Ank for Open and Ank-Pana for Close.
    /// Single-part numbers are unchanged by the session.
    pub fn display(&self, session: Session) -> String {
        match self {
            WagerNumber::Ank(n) | WagerNumber::Pana(n) => n.clone(),
            WagerNumber::AnkPana { ank, pana } => match session {
                Session::Open => format!("{pana}-{ank}"),
                Session::Close => format!("{ank}-{pana}"),
            },
        }
    }
}

/// A pending wager in the local slip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wager {
    pub id: WagerId,
    pub number: WagerNumber,
    pub points: u64,
    pub session: Session,
    /// Derived from `number` and `session` when the wager is created.
    pub display_number: String,
    pub placed: bool,
}

impl Wager {
    pub fn new(number: WagerNumber, points: u64, session: Session) -> Self {
        let display_number = number.display(session);
        Self {
            id: WagerId::new(),
            number,
            points,
            session,
            display_number,
            placed: false,
        }
    }
}

impl fmt::Display for Wager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{} ({})", self.display_number, self.points, self.session)
    }
}

/// A confirmed bet in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedBet {
    /// Server-assigned id, when the backend reported one.
    pub server_id: Option<String>,
    /// Local id of the wager this came from; `None` for bets fetched on load.
    pub wager_id: Option<WagerId>,
    pub market_name: String,
    pub game_name: String,
    pub number: String,
    pub points: u64,
    pub session: Session,
    pub status: BetStatus,
}

impl PlacedBet {
    pub fn from_wager(
        wager: &Wager,
        market_name: &str,
        game: GameKind,
        server_id: Option<String>,
        status: BetStatus,
    ) -> Self {
        Self {
            server_id,
            wager_id: Some(wager.id),
            market_name: market_name.to_string(),
            game_name: game.name().to_string(),
            number: wager.display_number.clone(),
            points: wager.points,
            session: wager.session,
            status,
        }
    }
}

impl fmt::Display for PlacedBet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} x{} ({}) {}",
            self.game_name, self.number, self.points, self.session, self.status
        )
    }
}

// ---------------------------------------------------------------------------
// Weekly chart
// ---------------------------------------------------------------------------

/// Placeholder shown for a missing digit or jodi.
pub const PLACEHOLDER: char = '-';

/// One day's draw: open digits, jodi, close digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayResult {
    pub open_digits: [char; 3],
    pub jodi: String,
    pub close_digits: [char; 3],
}

impl DayResult {
    /// A day with no data at all.
    pub fn empty() -> Self {
        Self {
            open_digits: [PLACEHOLDER; 3],
            jodi: PLACEHOLDER.to_string(),
            close_digits: [PLACEHOLDER; 3],
        }
    }
}

/// Monday-to-Sunday week of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyBucket {
    /// "DD-MM-YYYY to DD-MM-YYYY".
    pub week_key: String,
    /// The Monday; used for ordering.
    pub week_start: NaiveDate,
    /// Indexed Monday (0) through Sunday (6).
    days: [Option<DayResult>; 7],
}

impl WeeklyBucket {
    pub fn new(week_key: String, week_start: NaiveDate) -> Self {
        Self {
            week_key,
            week_start,
            days: Default::default(),
        }
    }

    pub fn day(&self, weekday: Weekday) -> Option<&DayResult> {
        self.days[weekday.num_days_from_monday() as usize].as_ref()
    }

    pub fn set_day(&mut self, weekday: Weekday, result: DayResult) {
        self.days[weekday.num_days_from_monday() as usize] = Some(result);
    }

    /// All seven days in display order, Monday first.
    pub fn days(&self) -> impl Iterator<Item = (Weekday, Option<&DayResult>)> {
        WEEK_ORDER
            .iter()
            .map(move |&wd| (wd, self.day(wd)))
    }

    /// Number of days with a result.
    pub fn populated(&self) -> usize {
        self.days.iter().filter(|d| d.is_some()).count()
    }
}

/// Column order of the chart.
pub const WEEK_ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English name of a weekday, as the chart columns are labelled.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Local input problems. Never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing-field: {0}")]
    MissingField(String),

    #[error("bad-format: {0}")]
    BadFormat(String),

    #[error("non-positive-points: {0}")]
    NonPositivePoints(String),

    #[error("empty-slip: no bets to place")]
    EmptySlip,

    #[error("insufficient-balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u64, available: u64 },

    #[error("points-overflow: slip total exceeds {max}")]
    PointsOverflow { max: u64 },
}

impl ValidationError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) => "missing-field",
            ValidationError::BadFormat(_) => "bad-format",
            ValidationError::NonPositivePoints(_) => "non-positive-points",
            ValidationError::EmptySlip => "empty-slip",
            ValidationError::InsufficientBalance { .. } => "insufficient-balance",
            ValidationError::PointsOverflow { .. } => "points-overflow",
        }
    }

    /// Message shown inline next to the inputs.
    pub fn user_message(&self) -> String {
        match self {
            ValidationError::MissingField(msg)
            | ValidationError::BadFormat(msg)
            | ValidationError::NonPositivePoints(msg) => msg.clone(),
            ValidationError::EmptySlip => "No bets to place!".to_string(),
            ValidationError::InsufficientBalance { .. } => "Insufficient coins!".to_string(),
            ValidationError::PointsOverflow { .. } => "Points are too large!".to_string(),
        }
    }
}

/// Domain errors for the matka client.
#[derive(Debug, thiserror::Error)]
pub enum MatkaError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("not-authenticated: {0}")]
    NotAuthenticated(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl MatkaError {
    pub fn code(&self) -> &'static str {
        match self {
            MatkaError::Validation(v) => v.code(),
            MatkaError::NotAuthenticated(_) => "not-authenticated",
            MatkaError::Network(_) => "network",
        }
    }

    /// Whether the caller should send the user to log in again.
    pub fn needs_login(&self) -> bool {
        matches!(self, MatkaError::NotAuthenticated(_))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
