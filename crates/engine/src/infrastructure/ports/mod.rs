//! Port traits for infrastructure boundaries.
//!
//! The draw only reaches outside itself for the current time and for
//! randomness; both go through these traits so tests can pin them.

mod testing;

#[cfg(test)]
pub use testing::{MockClockPort, MockRandomPort};

pub use testing::{ClockPort, RandomPort};
