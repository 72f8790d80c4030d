//! The mystery draw: three sequential games and their derived series total

mod slot;
mod state;

pub use slot::{GameIndex, GameSlot};
pub use state::{DrawRejection, DrawState};
