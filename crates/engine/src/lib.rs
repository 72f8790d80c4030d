//! Bowldraw Engine library.
//!
//! Runs the mystery game draw for a bowling league night.
//!
//! ## Structure
//!
//! - `use_cases/` - the timed draw and the session around it
//! - `infrastructure/` - randomness, time and environment settings
//! - `api/` - terminal front end
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
