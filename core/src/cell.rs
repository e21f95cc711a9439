use serde::{Deserialize, Serialize};

/// One grid position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub is_mine: bool,
    /// Mines in the 8-neighbourhood, only meaningful when `is_mine` is false.
    pub adjacent: u8,
    pub opened: bool,
    pub flagged: bool,
}

/// What a renderer should draw for a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Open(u8),
    /// Mine shown by the reveal after a loss.
    Mine,
    /// The mine whose opening lost the round.
    Exploded,
    /// Flag left on a safe cell once a round is lost.
    WrongFlag,
}

impl Default for CellView {
    fn default() -> Self {
        Self::Hidden
    }
}
