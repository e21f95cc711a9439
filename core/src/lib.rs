#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use clock::*;
pub use error::*;
pub use generator::*;
pub use session::*;
pub use types::*;

mod board;
mod cell;
mod clock;
mod error;
mod generator;
mod session;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub side: Coord,
    pub mines: CellCount,
    #[serde(default)]
    pub first_move: FirstMove,
    /// Placing the last flag wins when every flag sits on a mine.
    #[serde(default)]
    pub flag_completion: bool,
}

impl GameConfig {
    /// The classic 16×16 board with 40 mines.
    pub const STANDARD: Self = Self::new_unchecked(16, 40);

    pub const fn new_unchecked(side: Coord, mines: CellCount) -> Self {
        Self {
            side,
            mines,
            first_move: FirstMove::Unprotected,
            flag_completion: false,
        }
    }

    pub fn new(side: Coord, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(side, mines);
        config.validate()?;
        Ok(config)
    }

    pub const fn with_first_move(self, first_move: FirstMove) -> Self {
        Self { first_move, ..self }
    }

    pub const fn with_flag_completion(self, flag_completion: bool) -> Self {
        Self {
            flag_completion,
            ..self
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.side == 0 {
            return Err(GameError::ZeroSide);
        }
        if self.mines == 0 {
            return Err(GameError::NoMines);
        }
        let cells = self.total_cells();
        if self.mines >= cells {
            return Err(GameError::TooManyMines {
                mines: self.mines,
                cells,
            });
        }
        Ok(())
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.side, self.side)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}
