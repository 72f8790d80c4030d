//! API layer - terminal entry point.

pub mod terminal;

pub use terminal::{run, Command, TerminalError};
