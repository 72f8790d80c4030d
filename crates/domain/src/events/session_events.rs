//! Game session mutation outcomes.

use crate::aggregates::{Screen, Theme};
use crate::value_objects::{PrizeAmount, PrizeSlot};

/// Outcome of changing the pass-through session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    ScreenChanged { from: Screen, to: Screen },
    ConfigReplaced,
    PrizeChanged {
        slot: PrizeSlot,
        from: PrizeAmount,
        to: PrizeAmount,
    },
    ThemeChanged { to: Theme },
    PrizeEditorToggled { open: bool },
}
