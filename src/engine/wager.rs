//! Wager input validation.
//!
//! Turns what the user typed into a `WagerNumber` and a stake, checking in
//! order: required fields, game-specific format, positive points. The
//! first failure wins.

use crate::types::{GameKind, NumberShape, ValidationError, WagerNumber};

/// Raw input fields as typed. Which fields matter depends on the game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WagerDraft {
    /// The Ank digit (Single Ank, Half Sangam).
    pub ank: String,
    /// The Pana triple (Triple Pana, Half Sangam).
    pub pana: String,
    pub points: String,
}

impl WagerDraft {
    pub fn ank(ank: &str, points: &str) -> Self {
        Self {
            ank: ank.to_string(),
            points: points.to_string(),
            ..Self::default()
        }
    }

    pub fn pana(pana: &str, points: &str) -> Self {
        Self {
            pana: pana.to_string(),
            points: points.to_string(),
            ..Self::default()
        }
    }

    pub fn ank_pana(ank: &str, pana: &str, points: &str) -> Self {
        Self {
            ank: ank.to_string(),
            pana: pana.to_string(),
            points: points.to_string(),
        }
    }

    pub fn clear(&mut self) {
        self.ank.clear();
        self.pana.clear();
        self.points.clear();
    }
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

/// Validate a draft for `game`. Never touches the network.
pub fn validate(game: GameKind, draft: &WagerDraft) -> Result<(WagerNumber, u64), ValidationError> {
    let ank = draft.ank.trim();
    let pana = draft.pana.trim();
    let points = draft.points.trim();

    match game.shape() {
        NumberShape::Ank if ank.is_empty() || points.is_empty() => {
            return Err(ValidationError::MissingField(
                "Both ank and points are required!".into(),
            ))
        }
        NumberShape::Pana if pana.is_empty() || points.is_empty() => {
            return Err(ValidationError::MissingField(
                "Both input and points are required!".into(),
            ))
        }
        NumberShape::AnkPana if ank.is_empty() || pana.is_empty() || points.is_empty() => {
            return Err(ValidationError::MissingField(
                "Ank, Pana, and Points are required!".into(),
            ))
        }
        _ => {}
    }

    let number = match game.shape() {
        NumberShape::Ank => {
            if !is_digits(ank, 1) {
                return Err(ValidationError::BadFormat("Ank must be a single digit!".into()));
            }
            WagerNumber::Ank(ank.to_string())
        }
        NumberShape::Pana => {
            if !is_digits(pana, 3) {
                return Err(ValidationError::BadFormat(
                    "Input must be a three-digit number!".into(),
                ));
            }
            WagerNumber::Pana(pana.to_string())
        }
        NumberShape::AnkPana => {
            if !is_digits(ank, 1) || !is_digits(pana, 3) {
                return Err(ValidationError::BadFormat(
                    "Ank must be a single digit and Pana must be a three-digit number!".into(),
                ));
            }
            WagerNumber::AnkPana {
                ank: ank.to_string(),
                pana: pana.to_string(),
            }
        }
    };

    match points.parse::<u64>() {
        Ok(p) if p > 0 => Ok((number, p)),
        _ => Err(ValidationError::NonPositivePoints(
            "Points must be greater than 0!".into(),
        )),
    }
}
