//! Session controller - one user's pass through setup and play.
//!
//! A fresh `DrawEngine` is created every time the play screen is entered and
//! shut down when the session returns to setup, so each play screen starts
//! with an empty draw.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{broadcast, watch, Mutex};

use bowldraw_domain::{
    DomainError, DrawConfig, DrawEvent, DrawId, DrawRejection, DrawState, GameIndex, GameSession,
    PrizeAmount, PrizeSlot, Screen, SessionUpdate, SetupError, SetupForm, Theme,
};

use crate::infrastructure::ports::{ClockPort, RandomPort};
use crate::infrastructure::settings::{DrawTiming, EngineSettings};
use crate::use_cases::draw::DrawEngine;

/// Errors from session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("The draw is only available on the play screen")]
    NotPlaying,
    #[error("Only possible on the setup screen")]
    NotInSetup,
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error(transparent)]
    Draw(#[from] DrawRejection),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

struct SessionInner {
    session: GameSession,
    engine: Option<DrawEngine>,
}

pub struct SessionController {
    timing: DrawTiming,
    random: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
    inner: Mutex<SessionInner>,
}

impl SessionController {
    pub fn new(
        settings: &EngineSettings,
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let session = GameSession::new(settings.initial_config()).with_theme(settings.theme);
        Self {
            timing: settings.timing,
            random,
            clock,
            inner: Mutex::new(SessionInner {
                session,
                engine: None,
            }),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Copy of the current pass-through state.
    pub async fn session(&self) -> GameSession {
        self.inner.lock().await.session.clone()
    }

    pub async fn screen(&self) -> Screen {
        self.inner.lock().await.session.screen()
    }

    /// Current draw, while on the play screen
    pub async fn draw_state(&self) -> Option<DrawState> {
        let inner = self.inner.lock().await;
        inner.engine.as_ref().map(DrawEngine::snapshot)
    }

    /// Watch the draw of the current play screen.
    pub async fn subscribe_draws(&self) -> Option<watch::Receiver<DrawState>> {
        let inner = self.inner.lock().await;
        inner.engine.as_ref().map(DrawEngine::subscribe)
    }

    /// Draw events of the current play screen.
    pub async fn draw_events(&self) -> Option<broadcast::Receiver<DrawEvent>> {
        let inner = self.inner.lock().await;
        inner.engine.as_ref().map(DrawEngine::events)
    }

    /// Wait for the current draw, if any, to finish animating.
    pub async fn wait_until_idle(&self) {
        let Some(mut states) = self.subscribe_draws().await else {
            return;
        };
        let _ = states
            .wait_for(|state| state.active_draw().is_none())
            .await;
    }

    // =========================================================================
    // Setup screen
    // =========================================================================

    /// Validate the setup form and replace the configuration.
    pub async fn configure(&self, form: &SetupForm) -> Result<DrawConfig, SessionError> {
        let mut inner = self.inner.lock().await;
        if inner.session.screen() != Screen::Setup {
            return Err(SessionError::NotInSetup);
        }
        let config = form.validate()?;
        inner.session.configure(config.clone())?;
        tracing::info!(
            league = %config.league_name(),
            min_score = %config.min_score(),
            "Draw configured"
        );
        Ok(config)
    }

    /// Enter the play screen with an empty draw.
    pub async fn start(&self) -> Result<SessionUpdate, SessionError> {
        let mut inner = self.inner.lock().await;
        if inner.session.screen() != Screen::Setup {
            return Err(SessionError::NotInSetup);
        }
        let update = inner.session.start()?;
        let min_score = inner.session.config().min_score();
        inner.engine = Some(DrawEngine::new(
            min_score,
            self.timing,
            self.random.clone(),
            self.clock.clone(),
        ));
        tracing::info!(
            league = %inner.session.config().league_name(),
            min_score = %min_score,
            "Play screen entered"
        );
        Ok(update)
    }

    // =========================================================================
    // Play screen
    // =========================================================================

    pub async fn draw(&self, index: GameIndex) -> Result<DrawId, SessionError> {
        let inner = self.inner.lock().await;
        let engine = inner.engine.as_ref().ok_or(SessionError::NotPlaying)?;
        Ok(engine.draw(index).await?)
    }

    /// Draw by zero-based position.
    pub async fn draw_position(&self, position: usize) -> Result<DrawId, SessionError> {
        let index = GameIndex::from_position(position)?;
        self.draw(index).await
    }

    pub async fn reset(&self) -> Result<(), SessionError> {
        let inner = self.inner.lock().await;
        let engine = inner.engine.as_ref().ok_or(SessionError::NotPlaying)?;
        engine.reset().await;
        Ok(())
    }

    /// Leave the play screen, discarding the draw and any timer in flight.
    pub async fn return_to_setup(&self) -> Result<SessionUpdate, SessionError> {
        let mut inner = self.inner.lock().await;
        if inner.session.screen() != Screen::Play {
            return Err(SessionError::NotPlaying);
        }
        let update = inner.session.return_to_setup()?;
        if let Some(engine) = inner.engine.take() {
            engine.shutdown().await;
        }
        tracing::info!("Returned to setup");
        Ok(update)
    }

    pub async fn toggle_prize_editor(&self) -> Result<bool, SessionError> {
        let mut inner = self.inner.lock().await;
        if inner.session.screen() != Screen::Play {
            return Err(SessionError::NotPlaying);
        }
        inner.session.toggle_prize_editor()?;
        Ok(inner.session.is_prize_editor_open())
    }

    // =========================================================================
    // Either screen
    // =========================================================================

    /// Parse and store one prize amount.
    pub async fn set_prize(
        &self,
        slot: PrizeSlot,
        input: &str,
    ) -> Result<SessionUpdate, SessionError> {
        let amount = PrizeAmount::parse(input)?;
        let mut inner = self.inner.lock().await;
        let update = inner.session.set_prize(slot, amount);
        tracing::debug!(slot = %slot, "Prize updated");
        Ok(update)
    }

    pub async fn toggle_theme(&self) -> Theme {
        let mut inner = self.inner.lock().await;
        inner.session.toggle_theme();
        inner.session.theme()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::infrastructure::clock::{FixedClock, FixedRandom};
    use crate::infrastructure::ports::MockClockPort;

    fn controller() -> SessionController {
        SessionController::new(
            &EngineSettings::default(),
            Arc::new(FixedRandom(0.5)),
            Arc::new(FixedClock(Utc::now())),
        )
    }

    fn form(min_score: &str) -> SetupForm {
        SetupForm {
            league_name: "Wednesday Night Mixed".to_string(),
            min_score: min_score.to_string(),
            game1_prize: "25".to_string(),
            game2_prize: "25".to_string(),
            game3_prize: "12.50".to_string(),
            series_prize: "50".to_string(),
        }
    }

    #[tokio::test]
    async fn starts_on_setup_with_settings() {
        let settings = EngineSettings {
            theme: Theme::Dark,
            ..EngineSettings::default()
        };
        let controller = SessionController::new(
            &settings,
            Arc::new(FixedRandom(0.5)),
            Arc::new(FixedClock(Utc::now())),
        );
        let session = controller.session().await;
        assert_eq!(session.screen(), Screen::Setup);
        assert_eq!(session.theme(), Theme::Dark);
        assert!(controller.draw_state().await.is_none());
    }

    #[tokio::test]
    async fn invalid_min_score_is_rejected_at_setup() {
        let controller = controller();
        let err = controller.configure(&form("301")).await.unwrap_err();
        assert!(matches!(err, SessionError::Setup(_)));
        assert_eq!(controller.session().await.config(), &DrawConfig::default());
    }

    #[tokio::test]
    async fn draw_requires_play_screen() {
        let controller = controller();
        assert!(matches!(
            controller.draw(GameIndex::First).await,
            Err(SessionError::NotPlaying)
        ));
        assert!(matches!(controller.reset().await, Err(SessionError::NotPlaying)));
        assert!(matches!(
            controller.toggle_prize_editor().await,
            Err(SessionError::NotPlaying)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn configured_min_score_drives_the_draw() {
        let mut clock = MockClockPort::new();
        let drawn_at = Utc::now();
        clock.expect_now().returning(move || drawn_at);

        let controller = SessionController::new(
            &EngineSettings::default(),
            Arc::new(FixedRandom(0.0)),
            Arc::new(clock),
        );
        controller.configure(&form("300")).await.expect("valid form");
        controller.start().await.expect("starts");
        assert!(matches!(controller.start().await, Err(SessionError::NotInSetup)));
        assert!(matches!(
            controller.configure(&form("200")).await,
            Err(SessionError::NotInSetup)
        ));

        controller.draw(GameIndex::First).await.expect("draw starts");
        controller.wait_until_idle().await;

        let state = controller.draw_state().await.expect("playing");
        let slot = state.slot(GameIndex::First);
        assert_eq!(slot.value().map(|s| s.value()), Some(300));
        assert_eq!(slot.drawn_at(), Some(drawn_at));
    }

    #[tokio::test(start_paused = true)]
    async fn rejections_surface_as_draw_errors() {
        let controller = controller();
        controller.start().await.expect("starts");
        assert!(matches!(
            controller.draw_position(1).await,
            Err(SessionError::Draw(DrawRejection::PredecessorMissing { .. }))
        ));
        assert!(matches!(
            controller.draw_position(7).await,
            Err(SessionError::Draw(DrawRejection::IndexOutOfRange { position: 7 }))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn return_to_setup_discards_the_draw() {
        let controller = controller();
        controller.start().await.expect("starts");
        controller.draw(GameIndex::First).await.expect("draw starts");
        controller.wait_until_idle().await;
        controller.draw(GameIndex::Second).await.expect("draw starts");
        assert!(controller.toggle_prize_editor().await.expect("playing"));

        controller.return_to_setup().await.expect("returns");
        let session = controller.session().await;
        assert_eq!(session.screen(), Screen::Setup);
        assert!(!session.is_prize_editor_open());
        assert!(controller.draw_state().await.is_none());

        controller.start().await.expect("starts again");
        assert_eq!(controller.draw_state().await, Some(DrawState::new()));
    }

    #[tokio::test(start_paused = true)]
    async fn draw_events_follow_the_play_screen() {
        let controller = controller();
        assert!(controller.draw_events().await.is_none());
        controller.start().await.expect("starts");
        let mut events = controller.draw_events().await.expect("playing");

        let first = controller.draw(GameIndex::First).await.expect("draw starts");
        controller.wait_until_idle().await;
        let second = controller.draw(GameIndex::Second).await.expect("draw starts");
        controller.return_to_setup().await.expect("returns");

        let mut received = Vec::new();
        while let Ok(event) = events.try_recv() {
            if !matches!(event, DrawEvent::Resampled { .. }) {
                received.push(event);
            }
        }
        assert_eq!(received.len(), 4);
        assert_eq!(
            received[0],
            DrawEvent::Started {
                index: GameIndex::First,
                draw_id: first
            }
        );
        assert!(matches!(
            received[1],
            DrawEvent::Completed { index: GameIndex::First, draw_id, .. } if draw_id == first
        ));
        assert_eq!(
            received[2],
            DrawEvent::Started {
                index: GameIndex::Second,
                draw_id: second
            }
        );
        assert_eq!(
            received[3],
            DrawEvent::Cancelled {
                index: GameIndex::Second,
                draw_id: second
            }
        );
        assert!(controller.draw_events().await.is_none());
    }

    #[tokio::test]
    async fn prizes_edit_on_either_screen() {
        let controller = controller();
        controller
            .set_prize(PrizeSlot::Series, "$40")
            .await
            .expect("valid prize");
        controller.start().await.expect("starts");
        let update = controller
            .set_prize(PrizeSlot::Game1, "12.5")
            .await
            .expect("valid prize");
        assert_eq!(
            update,
            SessionUpdate::PrizeChanged {
                slot: PrizeSlot::Game1,
                from: PrizeAmount::zero(),
                to: PrizeAmount::Cents(1250),
            }
        );

        assert!(matches!(
            controller.set_prize(PrizeSlot::Game2, "-5").await,
            Err(SessionError::Domain(DomainError::Validation(_)))
        ));

        let session = controller.session().await;
        assert_eq!(session.config().prizes().get(PrizeSlot::Series).to_string(), "$40");
        assert_eq!(session.config().prizes().get(PrizeSlot::Game1).to_string(), "$12.50");
    }

    #[tokio::test]
    async fn theme_toggles_on_any_screen() {
        let controller = controller();
        assert_eq!(controller.toggle_theme().await, Theme::Dark);
        controller.start().await.expect("starts");
        assert_eq!(controller.toggle_theme().await, Theme::Light);
    }
}
