//! Draw state aggregate - the sequential mystery draw
//!
//! # Invariants
//!
//! - Game N may only be drawn once game N-1 has a committed value
//! - At most one game is drawing at any time (implied by the ordering rule:
//!   a game's predecessor must be committed, so nothing before it is drawing)
//! - A committed value is never overwritten; only `reset()` clears it
//! - Animation ticks are only accepted from the draw that currently owns the slot
//!
//! Every transition is a pure function from `&DrawState` to a new `DrawState`,
//! so callers can apply it atomically and publish the result.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::ids::DrawId;
use crate::value_objects::{Score, SeriesTotal};

use super::{GameIndex, GameSlot};

/// Why a draw (or one of its animation ticks) was declined
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawRejection {
    #[error("No game at position {position}; expected 0, 1 or 2")]
    IndexOutOfRange { position: usize },

    #[error("{index} has already been drawn")]
    AlreadyDrawn { index: GameIndex },

    #[error("{index} is already being drawn")]
    AlreadyDrawing { index: GameIndex },

    #[error("{index} cannot be drawn before {requires}")]
    PredecessorMissing {
        index: GameIndex,
        requires: GameIndex,
    },

    #[error("Draw {draw_id} no longer owns {index}")]
    StaleDraw { index: GameIndex, draw_id: DrawId },
}

/// The three games of one mystery draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawState {
    slots: [GameSlot; 3],
}

impl Default for DrawState {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawState {
    /// A fresh draw with every game absent.
    pub fn new() -> Self {
        Self {
            slots: GameIndex::ALL.map(GameSlot::empty),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn slots(&self) -> &[GameSlot; 3] {
        &self.slots
    }

    pub fn slot(&self, index: GameIndex) -> &GameSlot {
        &self.slots[index.position()]
    }

    /// Sum of the three games once all are drawn; recomputed on every call.
    pub fn series_total(&self) -> Option<SeriesTotal> {
        let [first, second, third] = &self.slots;
        Some(SeriesTotal::of([first.value()?, second.value()?, third.value()?]))
    }

    /// The game currently animating, with its draw handle
    pub fn active_draw(&self) -> Option<(GameIndex, DrawId)> {
        self.slots
            .iter()
            .find_map(|slot| slot.active_draw().map(|id| (slot.index(), id)))
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(GameSlot::is_present)
    }

    /// The next game the sequence allows, if any
    pub fn next_drawable(&self) -> Option<GameIndex> {
        GameIndex::ALL
            .into_iter()
            .find(|index| self.check_can_draw(*index).is_ok())
    }

    pub fn can_draw(&self, index: GameIndex) -> bool {
        self.check_can_draw(index).is_ok()
    }

    /// Check every precondition of starting a draw for `index`.
    pub fn check_can_draw(&self, index: GameIndex) -> Result<(), DrawRejection> {
        let slot = self.slot(index);
        if slot.is_drawing() {
            return Err(DrawRejection::AlreadyDrawing { index });
        }
        if slot.is_present() {
            return Err(DrawRejection::AlreadyDrawn { index });
        }
        if let Some(requires) = index.predecessor() {
            if !self.slot(requires).is_present() {
                return Err(DrawRejection::PredecessorMissing { index, requires });
            }
        }
        Ok(())
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Mark `index` as drawing under the handle `draw_id`.
    pub fn begin_draw(&self, index: GameIndex, draw_id: DrawId) -> Result<Self, DrawRejection> {
        self.check_can_draw(index)?;
        let mut next = self.clone();
        next.slots[index.position()].start(draw_id);
        Ok(next)
    }

    /// Show an intermediate animation frame.
    pub fn resample(
        &self,
        index: GameIndex,
        draw_id: DrawId,
        preview: Score,
    ) -> Result<Self, DrawRejection> {
        self.check_owner(index, draw_id)?;
        let mut next = self.clone();
        next.slots[index.position()].show(preview);
        Ok(next)
    }

    /// Fix the final value and clear the drawing flag.
    pub fn complete(
        &self,
        index: GameIndex,
        draw_id: DrawId,
        score: Score,
        at: DateTime<Utc>,
    ) -> Result<Self, DrawRejection> {
        self.check_owner(index, draw_id)?;
        let mut next = self.clone();
        next.slots[index.position()].commit(score, at);
        Ok(next)
    }

    /// Clear every game, including any draw in flight.
    pub fn reset(&self) -> Self {
        Self::new()
    }

    fn check_owner(&self, index: GameIndex, draw_id: DrawId) -> Result<(), DrawRejection> {
        if self.slot(index).active_draw() == Some(draw_id) {
            Ok(())
        } else {
            Err(DrawRejection::StaleDraw { index, draw_id })
        }
    }
}
