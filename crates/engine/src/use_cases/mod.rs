//! Use cases - User story orchestration.
//!
//! - `draw` - the timed, sequential mystery draw
//! - `session` - setup and play screens around a draw

pub mod draw;
pub mod session;

pub use draw::DrawEngine;
pub use session::{SessionController, SessionError};
