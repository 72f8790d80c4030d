//! Aggregate roots - domain objects that own their related data
//!
//! Each aggregate:
//! - Owns all its constituent parts (enforced by Rust ownership)
//! - Exposes behavior through methods, not public fields
//! - Returns outcome enums from mutations
//!
//! `DrawState` lives in `crate::draw`: its transitions are pure functions
//! returning a new state rather than `&mut self` mutations.

pub mod draw_config;
pub mod game_session;

pub use draw_config::{DrawConfig, SetupError, SetupField, SetupForm};
pub use game_session::{GameSession, Screen, Theme};
