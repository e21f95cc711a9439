use thiserror::Error;

use crate::CellCount;

/// Construction and placement failures. Moves on a live session never fail, they are no-ops instead.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board side must be at least 1")]
    ZeroSide,
    #[error("At least one mine is required")]
    NoMines,
    #[error("Too many mines: {mines} requested but the board has {cells} cells")]
    TooManyMines { mines: CellCount, cells: CellCount },
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Layout has {placed} distinct mines but the board expects {expected}")]
    LayoutMismatch { expected: CellCount, placed: CellCount },
}

pub type Result<T> = core::result::Result<T, GameError>;
