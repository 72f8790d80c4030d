//! Value objects - Immutable objects defined by their attributes

mod league_name;
mod prize;
mod score;

pub use league_name::{LeagueName, DEFAULT_LEAGUE_NAME};
pub use prize::{PrizeAmount, PrizeAmounts, PrizeSlot};
pub use score::{
    sample_score, MinScore, Score, SeriesTotal, DEFAULT_MIN_SCORE, MAX_SCORE,
};
