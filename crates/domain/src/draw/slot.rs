//! Game slots - the three positions of a mystery draw

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::DrawId;
use crate::value_objects::{PrizeSlot, Score};

use super::DrawRejection;

/// Position of a game within the draw sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameIndex {
    First,
    Second,
    Third,
}

impl GameIndex {
    pub const ALL: [GameIndex; 3] = [GameIndex::First, GameIndex::Second, GameIndex::Third];

    /// Zero-based position (0, 1 or 2)
    pub fn position(&self) -> usize {
        match self {
            GameIndex::First => 0,
            GameIndex::Second => 1,
            GameIndex::Third => 2,
        }
    }

    /// Look up a game by its zero-based position.
    pub fn from_position(position: usize) -> Result<Self, DrawRejection> {
        match position {
            0 => Ok(GameIndex::First),
            1 => Ok(GameIndex::Second),
            2 => Ok(GameIndex::Third),
            _ => Err(DrawRejection::IndexOutOfRange { position }),
        }
    }

    /// The game that must be drawn before this one, if any
    pub fn predecessor(&self) -> Option<GameIndex> {
        match self {
            GameIndex::First => None,
            GameIndex::Second => Some(GameIndex::First),
            GameIndex::Third => Some(GameIndex::Second),
        }
    }

    pub fn prize_slot(&self) -> PrizeSlot {
        match self {
            GameIndex::First => PrizeSlot::Game1,
            GameIndex::Second => PrizeSlot::Game2,
            GameIndex::Third => PrizeSlot::Game3,
        }
    }
}

impl fmt::Display for GameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Game {}", self.position() + 1)
    }
}

/// One game of the draw.
///
/// `value` is only set when a draw completes. While a draw runs the slot
/// carries the draw's handle and the most recent resampled `preview`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSlot {
    index: GameIndex,
    value: Option<Score>,
    preview: Option<Score>,
    active_draw: Option<DrawId>,
    drawn_at: Option<DateTime<Utc>>,
}

impl GameSlot {
    pub(crate) fn empty(index: GameIndex) -> Self {
        Self {
            index,
            value: None,
            preview: None,
            active_draw: None,
            drawn_at: None,
        }
    }

    #[inline]
    pub fn index(&self) -> GameIndex {
        self.index
    }

    /// The committed score, once the draw has finished
    #[inline]
    pub fn value(&self) -> Option<Score> {
        self.value
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    #[inline]
    pub fn is_drawing(&self) -> bool {
        self.active_draw.is_some()
    }

    /// Handle of the draw currently animating this slot
    #[inline]
    pub fn active_draw(&self) -> Option<DrawId> {
        self.active_draw
    }

    /// What the play screen shows: the committed value, else the animation frame
    pub fn displayed(&self) -> Option<Score> {
        self.value.or(self.preview)
    }

    #[inline]
    pub fn drawn_at(&self) -> Option<DateTime<Utc>> {
        self.drawn_at
    }

    pub(crate) fn start(&mut self, draw_id: DrawId) {
        self.active_draw = Some(draw_id);
        self.preview = None;
    }

    pub(crate) fn show(&mut self, preview: Score) {
        self.preview = Some(preview);
    }

    pub(crate) fn commit(&mut self, score: Score, at: DateTime<Utc>) {
        self.value = Some(score);
        self.preview = None;
        self.active_draw = None;
        self.drawn_at = Some(at);
    }
}
