//! Draw use case - the timed mystery draw.
//!
//! `DrawEngine` owns one `DrawState` and drives the animated reveal:
//! - `draw(index)` validates the ordering rules, marks the game as drawing and
//!   schedules a repeating timer that resamples the shown score every tick
//! - the last tick commits the final score and clears the drawing flag
//! - `reset()` cancels any timer in flight and clears all three games
//!
//! Every state change goes through a pure `DrawState` transition applied
//! atomically on the watch channel, so renderers subscribe to snapshots and
//! never see a half-applied change. Each timer carries the `DrawId` it was
//! scheduled for; a tick whose id no longer owns the slot is dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use bowldraw_domain::{
    sample_score, DrawEvent, DrawId, DrawRejection, DrawState, GameIndex, MinScore, Score,
    SeriesTotal,
};

use crate::infrastructure::ports::{ClockPort, RandomPort};
use crate::infrastructure::settings::DrawTiming;

/// Events buffered per subscriber before it starts lagging
const EVENT_CAPACITY: usize = 256;

/// Shortest tick the timer accepts
const MIN_TICK: Duration = Duration::from_millis(1);

/// A scheduled draw animation
struct DrawTimer {
    draw_id: DrawId,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

struct EngineInner {
    min_score: MinScore,
    timing: DrawTiming,
    random: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
    state: watch::Sender<DrawState>,
    events: broadcast::Sender<DrawEvent>,
    /// Parent of every timer's token; cancelled when the engine is dropped
    stop: CancellationToken,
    /// One slot per game; guards starting, finishing and cancelling timers
    timers: Mutex<[Option<DrawTimer>; 3]>,
}

/// Runs the mystery draw for one play screen.
///
/// Dropping the engine cancels any draw still animating.
pub struct DrawEngine {
    inner: Arc<EngineInner>,
}

impl DrawEngine {
    pub fn new(
        min_score: MinScore,
        timing: DrawTiming,
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let (state, _) = watch::channel(DrawState::new());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(EngineInner {
                min_score,
                timing,
                random,
                clock,
                state,
                events,
                stop: CancellationToken::new(),
                timers: Mutex::new([None, None, None]),
            }),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The current state.
    pub fn snapshot(&self) -> DrawState {
        self.inner.state.borrow().clone()
    }

    /// Sum of the three games once all are drawn.
    pub fn series_total(&self) -> Option<SeriesTotal> {
        self.inner.state.borrow().series_total()
    }

    /// Receive every new state as it is published.
    pub fn subscribe(&self) -> watch::Receiver<DrawState> {
        self.inner.state.subscribe()
    }

    /// Receive individual draw events.
    pub fn events(&self) -> broadcast::Receiver<DrawEvent> {
        self.inner.events.subscribe()
    }

    /// Wait until no game is drawing.
    pub async fn wait_until_idle(&self) {
        let mut states = self.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = states
            .wait_for(|state| state.active_draw().is_none())
            .await;
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Start drawing the game at a zero-based position.
    pub async fn draw_position(&self, position: usize) -> Result<DrawId, DrawRejection> {
        let index = GameIndex::from_position(position)?;
        self.draw(index).await
    }

    /// Start drawing `index`.
    ///
    /// # Errors
    ///
    /// Returns a `DrawRejection`, leaving the state untouched, when the game
    /// is already drawn or drawing, or when the previous game has no value yet.
    pub async fn draw(&self, index: GameIndex) -> Result<DrawId, DrawRejection> {
        let mut timers = self.inner.timers.lock().await;
        let draw_id = DrawId::new();

        if let Err(rejection) = self.inner.apply(|state| state.begin_draw(index, draw_id)) {
            tracing::debug!(index = %index, reason = %rejection, "Draw rejected");
            return Err(rejection);
        }

        let slot = &mut timers[index.position()];
        if let Some(previous) = slot.take() {
            previous.cancel.cancel();
            tracing::debug!(
                index = %index,
                draw_id = %previous.draw_id,
                "Cancelled leftover timer before scheduling a new draw"
            );
        }

        self.inner.publish(DrawEvent::Started { index, draw_id });

        let cancel = self.inner.stop.child_token();
        let task = tokio::spawn(run_draw(
            self.inner.clone(),
            index,
            draw_id,
            cancel.clone(),
        ));
        *slot = Some(DrawTimer {
            draw_id,
            cancel,
            task,
        });

        tracing::info!(
            index = %index,
            draw_id = %draw_id,
            min_score = %self.inner.min_score,
            resamples = self.inner.timing.resample_count(),
            "Draw started"
        );
        Ok(draw_id)
    }

    /// Cancel any draw in flight and clear all three games.
    pub async fn reset(&self) {
        let mut timers = self.inner.timers.lock().await;
        // Cancelled tasks stop at their next await; no need to join them here
        drop(self.inner.cancel_all(&mut timers));
        self.inner.state.send_replace(DrawState::new());
        self.inner.publish(DrawEvent::Reset);
        tracing::info!("Draw reset");
    }

    /// Cancel any draw in flight and wait for its timer to stop.
    pub async fn shutdown(self) {
        let tasks = {
            let mut timers = self.inner.timers.lock().await;
            self.inner.cancel_all(&mut timers)
        };
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Draw timer ended abnormally");
            }
        }
    }
}

impl Drop for DrawEngine {
    fn drop(&mut self) {
        // Timers hold the inner state alive, so stop them explicitly.
        // The parent token reaches every timer without taking the lock.
        self.inner.stop.cancel();
    }
}

impl EngineInner {
    /// Apply a transition atomically; subscribers are only woken on success.
    fn apply<F>(&self, transition: F) -> Result<DrawState, DrawRejection>
    where
        F: FnOnce(&DrawState) -> Result<DrawState, DrawRejection>,
    {
        let mut outcome = None;
        self.state.send_if_modified(|state| {
            let result = transition(state);
            let changed = match &result {
                Ok(next) => {
                    *state = next.clone();
                    true
                }
                Err(_) => false,
            };
            outcome = Some(result);
            changed
        });
        // send_if_modified runs the closure exactly once
        outcome.unwrap_or_else(|| Ok(self.state.borrow().clone()))
    }

    fn publish(&self, event: DrawEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Cancel every scheduled timer, announcing each, and hand back their tasks.
    fn cancel_all(&self, timers: &mut [Option<DrawTimer>; 3]) -> Vec<JoinHandle<()>> {
        let mut tasks = Vec::new();
        for (index, slot) in GameIndex::ALL.into_iter().zip(timers.iter_mut()) {
            if let Some(timer) = slot.take() {
                timer.cancel.cancel();
                self.publish(DrawEvent::Cancelled {
                    index,
                    draw_id: timer.draw_id,
                });
                tracing::info!(index = %index, draw_id = %timer.draw_id, "Draw cancelled");
                tasks.push(timer.task);
            }
        }
        tasks
    }

    fn sample(&self) -> Score {
        sample_score(self.min_score, || self.random.next_unit())
    }

    fn resample(&self, index: GameIndex, draw_id: DrawId) -> Result<(), DrawRejection> {
        let preview = self.sample();
        self.apply(|state| state.resample(index, draw_id, preview))?;
        self.publish(DrawEvent::Resampled {
            index,
            draw_id,
            preview,
        });
        Ok(())
    }

    async fn complete(&self, index: GameIndex, draw_id: DrawId) -> Result<(), DrawRejection> {
        let mut timers = self.timers.lock().await;
        let score = self.sample();
        let at = self.clock.now();
        let next = self.apply(|state| state.complete(index, draw_id, score, at))?;

        let slot = &mut timers[index.position()];
        if slot.as_ref().is_some_and(|timer| timer.draw_id == draw_id) {
            *slot = None;
        }

        let series_total = next.series_total();
        self.publish(DrawEvent::Completed {
            index,
            draw_id,
            score,
            at,
            series_total,
        });
        tracing::info!(
            index = %index,
            draw_id = %draw_id,
            score = %score,
            series_total = ?series_total.map(|t| t.value()),
            "Draw completed"
        );
        Ok(())
    }
}

/// Timer task of one draw: resample every tick, commit on the last.
async fn run_draw(
    inner: Arc<EngineInner>,
    index: GameIndex,
    draw_id: DrawId,
    cancel: CancellationToken,
) {
    let tick = inner.timing.tick_interval.max(MIN_TICK);
    let samples = inner.timing.resample_count();
    let mut interval = tokio::time::interval_at(Instant::now() + tick, tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for sample in 1..=samples {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(index = %index, draw_id = %draw_id, "Draw timer stopped");
                return;
            }
            _ = interval.tick() => {}
        }

        let outcome = if sample < samples {
            inner.resample(index, draw_id)
        } else {
            inner.complete(index, draw_id).await
        };

        if let Err(rejection) = outcome {
            tracing::debug!(
                index = %index,
                draw_id = %draw_id,
                reason = %rejection,
                "Stale draw timer discarded"
            );
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    use super::*;
    use crate::infrastructure::clock::{FixedClock, FixedRandom};
    use crate::infrastructure::ports::MockRandomPort;

    fn engine_with(min_score: u16, random: Arc<dyn RandomPort>) -> DrawEngine {
        DrawEngine::new(
            MinScore::new(i64::from(min_score)).expect("valid min score"),
            DrawTiming::default(),
            random,
            Arc::new(FixedClock(Utc::now())),
        )
    }

    fn engine(min_score: u16) -> DrawEngine {
        engine_with(min_score, Arc::new(FixedRandom(0.5)))
    }

    fn drain(events: &mut broadcast::Receiver<DrawEvent>) -> Vec<DrawEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = events.try_recv() {
            drained.push(event);
        }
        drained
    }

    fn completions(events: &[DrawEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, DrawEvent::Completed { .. }))
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn draw_resamples_thirty_times_over_three_seconds() {
        let mut random = MockRandomPort::new();
        random.expect_next_unit().times(30).returning(|| 0.25);
        let engine = engine_with(125, Arc::new(random));
        let mut events = engine.events();

        let started = Instant::now();
        engine.draw(GameIndex::First).await.expect("first draw starts");
        assert!(engine.snapshot().slot(GameIndex::First).is_drawing());

        engine.wait_until_idle().await;
        assert_eq!(started.elapsed(), Duration::from_millis(3000));

        let slot = engine.snapshot().slot(GameIndex::First).clone();
        // floor(0.25 * 176) + 125
        assert_eq!(slot.value().map(|s| s.value()), Some(169));
        assert!(!slot.is_drawing());

        let events = drain(&mut events);
        let resamples = events
            .iter()
            .filter(|e| matches!(e, DrawEvent::Resampled { .. }))
            .count();
        assert_eq!(resamples, 29);
        assert_eq!(completions(&events), 1);
        assert!(matches!(events.first(), Some(DrawEvent::Started { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn value_stays_absent_until_the_last_tick() {
        let engine = engine(125);
        engine.draw(GameIndex::First).await.expect("draw starts");

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let slot = engine.snapshot().slot(GameIndex::First).clone();
        assert!(slot.is_drawing());
        assert!(slot.displayed().is_some());
        assert_eq!(slot.value(), None);
        assert!(engine.draw(GameIndex::Second).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn later_games_wait_for_their_predecessor() {
        let engine = engine(125);

        assert_eq!(
            engine.draw(GameIndex::Second).await.unwrap_err(),
            DrawRejection::PredecessorMissing {
                index: GameIndex::Second,
                requires: GameIndex::First
            }
        );
        assert_eq!(engine.snapshot(), DrawState::new());

        engine.draw(GameIndex::First).await.expect("first draw starts");
        engine.wait_until_idle().await;

        assert!(matches!(
            engine.draw(GameIndex::Third).await,
            Err(DrawRejection::PredecessorMissing { .. })
        ));
        assert!(!engine.snapshot().slot(GameIndex::Third).is_present());
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_draw_produces_one_completion() {
        let samples = Arc::new(AtomicUsize::new(0));
        let counter = samples.clone();
        let mut random = MockRandomPort::new();
        random.expect_next_unit().returning(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            0.9
        });
        let engine = engine_with(200, Arc::new(random));
        let mut events = engine.events();

        let first = engine.draw(GameIndex::First).await.expect("draw starts");
        let (a, b) = tokio::join!(engine.draw(GameIndex::First), engine.draw(GameIndex::First));
        assert!(matches!(a, Err(DrawRejection::AlreadyDrawing { .. })));
        assert!(matches!(b, Err(DrawRejection::AlreadyDrawing { .. })));

        engine.wait_until_idle().await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        let events = drain(&mut events);
        assert_eq!(completions(&events), 1);
        assert!(events.iter().all(|e| match e {
            DrawEvent::Started { draw_id, .. }
            | DrawEvent::Resampled { draw_id, .. }
            | DrawEvent::Completed { draw_id, .. } => *draw_id == first,
            _ => true,
        }));
        assert_eq!(samples.load(Ordering::SeqCst), 30);

        assert_eq!(
            engine.draw(GameIndex::First).await.unwrap_err(),
            DrawRejection::AlreadyDrawn {
                index: GameIndex::First
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_a_draw_in_flight() {
        let engine = engine(125);
        let mut events = engine.events();

        engine.draw(GameIndex::First).await.expect("draw starts");
        tokio::time::sleep(Duration::from_millis(1000)).await;
        engine.reset().await;

        assert_eq!(engine.snapshot(), DrawState::new());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(engine.snapshot(), DrawState::new());
        assert_eq!(engine.series_total(), None);

        let events = drain(&mut events);
        assert_eq!(completions(&events), 0);
        assert!(events.iter().any(|e| matches!(e, DrawEvent::Cancelled { .. })));
        assert!(matches!(events.last(), Some(DrawEvent::Reset)));
    }

    #[tokio::test(start_paused = true)]
    async fn redraw_after_reset_ignores_the_old_timer() {
        let engine = engine(125);
        let mut events = engine.events();

        let old = engine.draw(GameIndex::First).await.expect("draw starts");
        tokio::time::sleep(Duration::from_millis(2950)).await;
        engine.reset().await;
        let new = engine.draw(GameIndex::First).await.expect("redraw starts");
        assert_ne!(old, new);

        engine.wait_until_idle().await;
        let events = drain(&mut events);
        let completed: Vec<DrawId> = events
            .iter()
            .filter_map(|e| match e {
                DrawEvent::Completed { draw_id, .. } => Some(*draw_id),
                _ => None,
            })
            .collect();
        assert_eq!(completed, vec![new]);
    }

    #[tokio::test(start_paused = true)]
    async fn full_series_with_minimum_125() {
        let engine = engine_with(125, Arc::new(crate::infrastructure::clock::SystemRandom::new()));

        engine.draw(GameIndex::First).await.expect("game 1 starts");
        engine.wait_until_idle().await;
        let first = engine.snapshot().slot(GameIndex::First).value().expect("game 1 drawn");
        assert!((125..=300).contains(&first.value()));

        assert!(engine.draw(GameIndex::Third).await.is_err());
        assert!(!engine.snapshot().slot(GameIndex::Third).is_present());

        engine.draw(GameIndex::Second).await.expect("game 2 starts");
        engine.wait_until_idle().await;
        assert_eq!(engine.series_total(), None);

        engine.draw(GameIndex::Third).await.expect("game 3 starts");
        engine.wait_until_idle().await;

        let state = engine.snapshot();
        let sum: u16 = state
            .slots()
            .iter()
            .map(|slot| slot.value().expect("all drawn").value())
            .sum();
        assert!(state.slots().iter().all(|s| (125..=300).contains(&s.value().map_or(0, |v| v.value()))));
        assert_eq!(engine.series_total().map(|t| t.value()), Some(sum));
    }

    #[tokio::test(start_paused = true)]
    async fn minimum_300_always_draws_300() {
        let engine = engine_with(300, Arc::new(crate::infrastructure::clock::SystemRandom::new()));
        for index in GameIndex::ALL {
            engine.draw(index).await.expect("draw starts");
            engine.wait_until_idle().await;
        }
        assert_eq!(engine.series_total().map(|t| t.value()), Some(900));
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_range_position_is_rejected() {
        let engine = engine(125);
        assert_eq!(
            engine.draw_position(3).await.unwrap_err(),
            DrawRejection::IndexOutOfRange { position: 3 }
        );
        engine.draw_position(0).await.expect("position 0 is game 1");
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_timers() {
        let engine = engine(125);
        let mut states = engine.subscribe();
        engine.draw(GameIndex::First).await.expect("draw starts");
        engine.shutdown().await;

        tokio::time::sleep(Duration::from_secs(5)).await;
        let last = states.borrow_and_update().clone();
        assert!(last.slot(GameIndex::First).value().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_announces_the_cancelled_draw() {
        let engine = engine(125);
        let mut events = engine.events();
        let draw_id = engine.draw(GameIndex::First).await.expect("draw starts");
        tokio::time::sleep(Duration::from_millis(500)).await;

        engine.shutdown().await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        let events = drain(&mut events);
        assert_eq!(completions(&events), 0);
        assert_eq!(
            events.last(),
            Some(&DrawEvent::Cancelled {
                index: GameIndex::First,
                draw_id
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_engine_stops_timers() {
        let engine = engine(125);
        let mut states = engine.subscribe();
        let mut events = engine.events();
        engine.draw(GameIndex::First).await.expect("draw starts");
        tokio::time::sleep(Duration::from_millis(500)).await;

        // Held lock must not stop the drop from reaching the timers
        let inner = engine.inner.clone();
        let guard = inner.timers.lock().await;
        drop(engine);
        drop(guard);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(states.borrow_and_update().slot(GameIndex::First).value().is_none());
        assert_eq!(completions(&drain(&mut events)), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_the_final_state() {
        let engine = engine(125);
        let mut states = engine.subscribe();
        engine.draw(GameIndex::First).await.expect("draw starts");

        let done = states
            .wait_for(|s| s.slot(GameIndex::First).is_present())
            .await
            .expect("engine alive")
            .clone();
        assert_eq!(done.slot(GameIndex::First).value().map(|s| s.value()), Some(213));
    }
}
