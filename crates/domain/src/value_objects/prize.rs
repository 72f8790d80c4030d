//! Prize amounts for the three mystery games and the mystery series
//!
//! Prizes are display-only: the draw never reads them. A prize is either a
//! dollar amount (stored in cents) or a free-text label such as "Free Game".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Maximum length for a free-text prize label
const MAX_LABEL_LENGTH: usize = 100;

// ============================================================================
// PrizeSlot
// ============================================================================

/// Which prize is being displayed or edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrizeSlot {
    Game1,
    Game2,
    Game3,
    Series,
}

impl PrizeSlot {
    pub const ALL: [PrizeSlot; 4] = [
        PrizeSlot::Game1,
        PrizeSlot::Game2,
        PrizeSlot::Game3,
        PrizeSlot::Series,
    ];

    /// Title shown next to the prize
    pub fn title(&self) -> &'static str {
        match self {
            PrizeSlot::Game1 => "Game 1",
            PrizeSlot::Game2 => "Game 2",
            PrizeSlot::Game3 => "Game 3",
            PrizeSlot::Series => "Mystery Series",
        }
    }
}

impl fmt::Display for PrizeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrizeSlot::Game1 => write!(f, "game1"),
            PrizeSlot::Game2 => write!(f, "game2"),
            PrizeSlot::Game3 => write!(f, "game3"),
            PrizeSlot::Series => write!(f, "series"),
        }
    }
}

impl FromStr for PrizeSlot {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "g1" | "game1" => Ok(PrizeSlot::Game1),
            "2" | "g2" | "game2" => Ok(PrizeSlot::Game2),
            "3" | "g3" | "game3" => Ok(PrizeSlot::Game3),
            "s" | "series" => Ok(PrizeSlot::Series),
            other => Err(DomainError::parse(format!("Unknown prize slot: '{}'", other))),
        }
    }
}

// ============================================================================
// PrizeAmount
// ============================================================================

/// A prize: a non-negative dollar amount or a display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum PrizeAmount {
    /// Dollar amount in cents
    Cents(u64),
    /// Free text shown verbatim
    Label(String),
}

impl PrizeAmount {
    pub fn zero() -> Self {
        Self::Cents(0)
    }

    /// Whole dollars; amounts beyond `u64::MAX` cents saturate.
    pub fn dollars(dollars: u64) -> Self {
        Self::Cents(dollars.saturating_mul(100))
    }

    /// Parse a prize from form input.
    ///
    /// Supported formats:
    /// - "" - no prize entered yet, treated as $0
    /// - "25", "$25", "12.5", "12.50" - dollar amounts (at most two decimals)
    /// - anything else that is not numeric - a display label
    ///
    /// Negative numbers and malformed numbers are rejected.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self::zero());
        }

        let numeric = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
        let looks_numeric = numeric
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == '-' || c == ',')
            && numeric.chars().any(|c| c.is_ascii_digit());

        if !looks_numeric {
            if trimmed.chars().count() > MAX_LABEL_LENGTH {
                return Err(DomainError::validation(format!(
                    "Prize label cannot exceed {} characters",
                    MAX_LABEL_LENGTH
                )));
            }
            return Ok(Self::Label(trimmed.to_string()));
        }

        if numeric.starts_with('-') {
            return Err(DomainError::validation(format!(
                "Prize amount cannot be negative (got '{}')",
                trimmed
            )));
        }

        parse_cents(&numeric.replace(',', ""))
            .map(Self::Cents)
            .ok_or_else(|| DomainError::parse(format!("Invalid prize amount: '{}'", trimmed)))
    }
}

fn parse_cents(input: &str) -> Option<u64> {
    let (whole, fraction) = match input.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (input, ""),
    };
    if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let cents: u64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<u64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };
    whole.checked_mul(100)?.checked_add(cents)
}

impl Default for PrizeAmount {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for PrizeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrizeAmount::Cents(cents) if cents % 100 == 0 => write!(f, "${}", cents / 100),
            PrizeAmount::Cents(cents) => write!(f, "${}.{:02}", cents / 100, cents % 100),
            PrizeAmount::Label(label) => write!(f, "{}", label),
        }
    }
}

impl FromStr for PrizeAmount {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// PrizeAmounts
// ============================================================================

/// The four prizes of a mystery game night
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeAmounts {
    game1: PrizeAmount,
    game2: PrizeAmount,
    game3: PrizeAmount,
    series: PrizeAmount,
}

impl PrizeAmounts {
    pub fn get(&self, slot: PrizeSlot) -> &PrizeAmount {
        match slot {
            PrizeSlot::Game1 => &self.game1,
            PrizeSlot::Game2 => &self.game2,
            PrizeSlot::Game3 => &self.game3,
            PrizeSlot::Series => &self.series,
        }
    }

    /// Replace one prize; last write wins.
    pub fn set(&mut self, slot: PrizeSlot, amount: PrizeAmount) {
        let target = match slot {
            PrizeSlot::Game1 => &mut self.game1,
            PrizeSlot::Game2 => &mut self.game2,
            PrizeSlot::Game3 => &mut self.game3,
            PrizeSlot::Series => &mut self.series,
        };
        *target = amount;
    }

    pub fn with(mut self, slot: PrizeSlot, amount: PrizeAmount) -> Self {
        self.set(slot, amount);
        self
    }
}
