//! Game session - the pass-through state around the draw
//!
//! Which screen is showing, the theme, whether the prize editor is open, and
//! the configuration. None of this carries rules beyond "last write wins" and
//! the two-screen flow; the draw itself lives in `DrawState`.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::events::SessionUpdate;
use crate::value_objects::{PrizeAmount, PrizeSlot};

use super::DrawConfig;

/// The screen a session is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    /// Configuration form
    Setup,
    /// Drawing screen
    Play,
}

/// Presentation theme; the draw is indifferent to it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "Light Mode",
            Theme::Dark => "Dark Mode",
        }
    }
}

/// One user's pass through setup and play
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    config: DrawConfig,
    screen: Screen,
    theme: Theme,
    prize_editor_open: bool,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(DrawConfig::default())
    }
}

impl GameSession {
    /// A session starting on the setup screen.
    pub fn new(config: DrawConfig) -> Self {
        Self {
            config,
            screen: Screen::Setup,
            theme: Theme::default(),
            prize_editor_open: false,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    #[inline]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[inline]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[inline]
    pub fn is_prize_editor_open(&self) -> bool {
        self.prize_editor_open
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Leave the setup screen for the play screen.
    pub fn start(&mut self) -> Result<SessionUpdate, DomainError> {
        if self.screen != Screen::Setup {
            return Err(DomainError::invalid_state_transition(
                "Drawing has already started",
            ));
        }
        self.screen = Screen::Play;
        Ok(SessionUpdate::ScreenChanged {
            from: Screen::Setup,
            to: Screen::Play,
        })
    }

    /// Go back to the setup screen, closing the prize editor.
    pub fn return_to_setup(&mut self) -> Result<SessionUpdate, DomainError> {
        if self.screen != Screen::Play {
            return Err(DomainError::invalid_state_transition(
                "Already on the setup screen",
            ));
        }
        self.screen = Screen::Setup;
        self.prize_editor_open = false;
        Ok(SessionUpdate::ScreenChanged {
            from: Screen::Play,
            to: Screen::Setup,
        })
    }

    /// Replace the whole configuration; only allowed on the setup screen.
    pub fn configure(&mut self, config: DrawConfig) -> Result<SessionUpdate, DomainError> {
        if self.screen != Screen::Setup {
            return Err(DomainError::invalid_state_transition(
                "Configuration can only change on the setup screen",
            ));
        }
        self.config = config;
        Ok(SessionUpdate::ConfigReplaced)
    }

    /// Change one prize from either screen.
    pub fn set_prize(&mut self, slot: PrizeSlot, amount: PrizeAmount) -> SessionUpdate {
        let from = self.config.set_prize(slot, amount.clone());
        SessionUpdate::PrizeChanged {
            slot,
            from,
            to: amount,
        }
    }

    pub fn toggle_theme(&mut self) -> SessionUpdate {
        self.theme = self.theme.toggled();
        SessionUpdate::ThemeChanged { to: self.theme }
    }

    /// Show or hide the prize editor; it only exists on the play screen.
    pub fn toggle_prize_editor(&mut self) -> Result<SessionUpdate, DomainError> {
        if self.screen != Screen::Play {
            return Err(DomainError::invalid_state_transition(
                "The prize editor is only available while drawing",
            ));
        }
        self.prize_editor_open = !self.prize_editor_open;
        Ok(SessionUpdate::PrizeEditorToggled {
            open: self.prize_editor_open,
        })
    }
}
