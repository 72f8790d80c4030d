//! Bowldraw domain: the mystery game draw for bowling leagues.
//!
//! Pure types and transitions only. Timers, randomness sources and rendering
//! live in `bowldraw-engine`; randomness enters the domain as a closure.

pub mod aggregates;
pub mod draw;
pub mod error;
pub mod events;
pub mod ids;
pub mod value_objects;

pub use aggregates::{
    DrawConfig, GameSession, Screen, SetupError, SetupField, SetupForm, Theme,
};
pub use draw::{DrawRejection, DrawState, GameIndex, GameSlot};
pub use error::DomainError;
pub use events::{DrawEvent, SessionUpdate};
pub use ids::DrawId;
pub use value_objects::{
    sample_score, LeagueName, MinScore, PrizeAmount, PrizeAmounts, PrizeSlot, Score,
    SeriesTotal, DEFAULT_LEAGUE_NAME, DEFAULT_MIN_SCORE, MAX_SCORE,
};
