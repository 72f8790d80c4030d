//! Bowling score value objects and the uniform score sampler
//!
//! A bowling game scores between 0 and 300. The league's minimum score is the
//! lower bound of every mystery draw; 300 is always the upper bound.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Highest possible bowling score (a perfect game)
pub const MAX_SCORE: u16 = 300;

/// Minimum score used when the league does not configure one
pub const DEFAULT_MIN_SCORE: u16 = 125;

// ============================================================================
// MinScore
// ============================================================================

/// The configured lower bound of the draw range (0..=300)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct MinScore(u16);

impl MinScore {
    /// Create a validated minimum score.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when the value is negative or above 300.
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value < 0 {
            return Err(DomainError::validation(format!(
                "Minimum score cannot be negative (got {})",
                value
            )));
        }
        if value > i64::from(MAX_SCORE) {
            return Err(DomainError::validation(format!(
                "Minimum score cannot exceed {} (got {})",
                MAX_SCORE, value
            )));
        }
        Ok(Self(value as u16))
    }

    /// Parse a minimum score from form input.
    ///
    /// Surrounding whitespace is ignored. Anything that is not a whole number
    /// is a parse error; whole numbers outside 0..=300 are validation errors.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DomainError::parse("Minimum score is required"));
        }
        let value: i64 = trimmed.parse().map_err(|_| {
            DomainError::parse(format!("Minimum score must be a whole number, got '{}'", trimmed))
        })?;
        Self::new(value)
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    /// Number of distinct scores a draw can produce (`300 - min + 1`)
    pub fn range_width(&self) -> u16 {
        MAX_SCORE - self.0 + 1
    }
}

impl Default for MinScore {
    fn default() -> Self {
        Self(DEFAULT_MIN_SCORE)
    }
}

impl fmt::Display for MinScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for MinScore {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MinScore> for u16 {
    fn from(min: MinScore) -> u16 {
        min.0
    }
}

// ============================================================================
// Score
// ============================================================================

/// A single game score (0..=300)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Score(u16);

impl Score {
    pub fn new(value: u16) -> Result<Self, DomainError> {
        if value > MAX_SCORE {
            return Err(DomainError::validation(format!(
                "Score cannot exceed {} (got {})",
                MAX_SCORE, value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Score {
    type Error = DomainError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u16 {
    fn from(score: Score) -> u16 {
        score.0
    }
}

// ============================================================================
// SeriesTotal
// ============================================================================

/// Sum of the three drawn games (0..=900)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesTotal(u16);

impl SeriesTotal {
    pub fn of(games: [Score; 3]) -> Self {
        Self(games.iter().map(Score::value).sum())
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for SeriesTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Sampler
// ============================================================================

/// Draw a uniformly distributed score in `[min, 300]`.
///
/// `random` must yield a value in `[0, 1)`; the result is
/// `floor(random * (300 - min + 1)) + min`. Values outside that interval
/// (including NaN) are clamped so a misbehaving source can never produce a
/// score outside the range.
pub fn sample_score(min: MinScore, random: impl FnOnce() -> f64) -> Score {
    let unit = random();
    let unit = if unit.is_finite() { unit.clamp(0.0, 1.0) } else { 0.0 };
    let width = min.range_width();
    let offset = ((unit * f64::from(width)).floor() as u16).min(width - 1);
    Score(min.value() + offset)
}
