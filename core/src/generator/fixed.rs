use alloc::vec::Vec;

use super::*;

/// Always lays out the same mines. Used for deterministic rounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedLayout {
    mines: Vec<Coord2>,
}

impl FixedLayout {
    pub fn new(mines: &[Coord2]) -> Self {
        Self {
            mines: mines.to_vec(),
        }
    }
}

impl MinePlacer for FixedLayout {
    /// The layout is fixed, so a mine may land on `safe`.
    fn place(&mut self, board: &mut Board, safe: Option<Coord2>) -> Result<()> {
        if let Some(safe) = safe.filter(|safe| self.mines.contains(safe)) {
            log::warn!("Fixed layout puts a mine on the protected cell {:?}", safe);
        }
        board.set_mines(&self.mines)
    }

    fn check(&self, board: &Board) -> Result<()> {
        board.check_layout(&self.mines)
    }
}
