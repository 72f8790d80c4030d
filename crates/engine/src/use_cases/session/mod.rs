//! Session use cases.
//!
//! Orchestrates the setup and play screens around a `DrawEngine`.

mod controller;

pub use controller::{SessionController, SessionError};
