use serde::{Deserialize, Serialize};

use crate::*;
pub use fixed::*;
pub use random::*;

mod fixed;
mod random;

/// Source of mine layouts for a session, consulted on construction and on every restart.
pub trait MinePlacer {
    /// Lays out `board.mine_total()` mines, never on `safe` when given.
    fn place(&mut self, board: &mut Board, safe: Option<Coord2>) -> Result<()>;

    /// Whether [`MinePlacer::place`] can succeed on `board`, checked before any placement happens.
    fn check(&self, _board: &Board) -> Result<()> {
        Ok(())
    }
}

/// Whether the first opened cell of a round is protected from mines.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirstMove {
    /// Mines are laid out as soon as the round begins, the first click can lose.
    #[default]
    Unprotected,
    /// Mines are laid out on the first open, excluding the opened cell.
    Safe,
}

impl FirstMove {
    pub const fn delays_placement(self) -> bool {
        matches!(self, Self::Safe)
    }
}
