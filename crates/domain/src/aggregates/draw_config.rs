//! Draw configuration - what the league sets up before the draw
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: All fields are encapsulated
//! - **Valid by construction**: `new()` takes pre-validated types
//! - **Form boundary**: `SetupForm` turns raw text input into a `DrawConfig`
//!   and names the first field that failed, so a front end can reprompt it

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::error::DomainError;
use crate::value_objects::{
    LeagueName, MinScore, PrizeAmount, PrizeAmounts, PrizeSlot, MAX_SCORE,
};

/// Configuration of one mystery game night
///
/// # Example
///
/// ```
/// use bowldraw_domain::{DrawConfig, LeagueName, MinScore};
///
/// let config = DrawConfig::new(
///     LeagueName::new("Friday Scratch").unwrap(),
///     MinScore::new(150).unwrap(),
/// );
///
/// assert_eq!(
///     config.range_description(),
///     "Drawing random bowling scores between 150 and 300"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawConfig {
    league_name: LeagueName,
    min_score: MinScore,
    prizes: PrizeAmounts,
}

impl DrawConfig {
    pub fn new(league_name: LeagueName, min_score: MinScore) -> Self {
        Self {
            league_name,
            min_score,
            prizes: PrizeAmounts::default(),
        }
    }

    pub fn with_prizes(mut self, prizes: PrizeAmounts) -> Self {
        self.prizes = prizes;
        self
    }

    #[inline]
    pub fn league_name(&self) -> &LeagueName {
        &self.league_name
    }

    #[inline]
    pub fn min_score(&self) -> MinScore {
        self.min_score
    }

    #[inline]
    pub fn prizes(&self) -> &PrizeAmounts {
        &self.prizes
    }

    /// Replace one prize, returning the previous amount.
    pub fn set_prize(&mut self, slot: PrizeSlot, amount: PrizeAmount) -> PrizeAmount {
        let previous = self.prizes.get(slot).clone();
        self.prizes.set(slot, amount);
        previous
    }

    /// Subtitle of the play screen
    pub fn range_description(&self) -> String {
        format!(
            "Drawing random bowling scores between {} and {}",
            self.min_score, MAX_SCORE
        )
    }
}

// ============================================================================
// Setup form
// ============================================================================

/// A field of the setup form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    LeagueName,
    MinScore,
    Prize(PrizeSlot),
}

impl fmt::Display for SetupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupField::LeagueName => write!(f, "League Name"),
            SetupField::MinScore => write!(f, "Minimum Score"),
            SetupField::Prize(slot) => write!(f, "{} Prize", slot.title()),
        }
    }
}

/// A setup form field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {error}")]
pub struct SetupError {
    pub field: SetupField,
    pub error: DomainError,
}

impl SetupError {
    fn at(field: SetupField) -> impl FnOnce(DomainError) -> Self {
        move |error| Self { field, error }
    }
}

/// Raw text of the setup form, exactly as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupForm {
    pub league_name: String,
    pub min_score: String,
    pub game1_prize: String,
    pub game2_prize: String,
    pub game3_prize: String,
    pub series_prize: String,
}

impl SetupForm {
    /// Prefill the form from an existing configuration.
    pub fn from_config(config: &DrawConfig) -> Self {
        let prize = |slot| config.prizes().get(slot).to_string();
        Self {
            league_name: config.league_name().to_string(),
            min_score: config.min_score().to_string(),
            game1_prize: prize(PrizeSlot::Game1),
            game2_prize: prize(PrizeSlot::Game2),
            game3_prize: prize(PrizeSlot::Game3),
            series_prize: prize(PrizeSlot::Series),
        }
    }

    pub fn prize_input(&self, slot: PrizeSlot) -> &str {
        match slot {
            PrizeSlot::Game1 => &self.game1_prize,
            PrizeSlot::Game2 => &self.game2_prize,
            PrizeSlot::Game3 => &self.game3_prize,
            PrizeSlot::Series => &self.series_prize,
        }
    }

    /// Validate every field, in form order.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field. A minimum score that is not a whole
    /// number, is negative, or exceeds 300 is rejected here so a draw can
    /// never run with an empty range.
    pub fn validate(&self) -> Result<DrawConfig, SetupError> {
        let league_name =
            LeagueName::new(self.league_name.as_str()).map_err(SetupError::at(SetupField::LeagueName))?;
        let min_score =
            MinScore::parse(&self.min_score).map_err(SetupError::at(SetupField::MinScore))?;

        let mut prizes = PrizeAmounts::default();
        for slot in PrizeSlot::ALL {
            let amount = PrizeAmount::parse(self.prize_input(slot))
                .map_err(SetupError::at(SetupField::Prize(slot)))?;
            prizes.set(slot, amount);
        }

        Ok(DrawConfig::new(league_name, min_score).with_prizes(prizes))
    }
}
