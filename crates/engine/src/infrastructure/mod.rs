//! Infrastructure - implementations of the ports plus environment settings.

pub mod clock;
pub mod ports;
pub mod settings;
