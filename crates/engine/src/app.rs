//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    clock::{SystemClock, SystemRandom},
    ports::{ClockPort, RandomPort},
    settings::EngineSettings,
};
use crate::use_cases::SessionController;

/// Main application state.
///
/// Holds the settings the process started with and the session the terminal
/// front end drives.
pub struct App {
    pub settings: EngineSettings,
    pub session: Arc<SessionController>,
}

impl App {
    /// Wire the session up with the given randomness and time sources.
    pub fn new(
        settings: EngineSettings,
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let session = Arc::new(SessionController::new(&settings, random, clock));
        Self { settings, session }
    }

    /// Production wiring: thread-local RNG and the system clock.
    pub fn with_system_ports(settings: EngineSettings) -> Self {
        let random: Arc<dyn RandomPort> = Arc::new(SystemRandom::new());
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
        Self::new(settings, random, clock)
    }
}
