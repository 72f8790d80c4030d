//! Draw events
//!
//! Fine-grained notifications of what happened to a draw. Renderers that only
//! need the latest state subscribe to state snapshots instead; these events
//! exist for consumers that care about individual transitions (logs, sounds,
//! announcers).
//!
//! ## Session Mutation Events
//!
//! The `session_events` submodule contains return types from `GameSession`
//! mutations, communicating what changed.

pub mod session_events;

pub use session_events::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::draw::GameIndex;
use crate::ids::DrawId;
use crate::value_objects::{Score, SeriesTotal};

/// Something that happened to the mystery draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum DrawEvent {
    /// A game started its animated reveal
    #[serde(rename_all = "camelCase")]
    Started { index: GameIndex, draw_id: DrawId },

    /// An intermediate animation frame was shown
    #[serde(rename_all = "camelCase")]
    Resampled {
        index: GameIndex,
        draw_id: DrawId,
        preview: Score,
    },

    /// A game's final value was fixed
    #[serde(rename_all = "camelCase")]
    Completed {
        index: GameIndex,
        draw_id: DrawId,
        score: Score,
        at: DateTime<Utc>,
        /// Present once this completion finished the series
        series_total: Option<SeriesTotal>,
    },

    /// A draw's timer was cancelled before it completed
    #[serde(rename_all = "camelCase")]
    Cancelled { index: GameIndex, draw_id: DrawId },

    /// Every game was cleared
    Reset,
}

impl DrawEvent {
    /// The game this event concerns, if it concerns a single game
    pub fn index(&self) -> Option<GameIndex> {
        match self {
            DrawEvent::Started { index, .. }
            | DrawEvent::Resampled { index, .. }
            | DrawEvent::Completed { index, .. }
            | DrawEvent::Cancelled { index, .. } => Some(*index),
            DrawEvent::Reset => None,
        }
    }
}
