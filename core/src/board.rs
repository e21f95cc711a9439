use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::ops::Index;
use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// A cell opened by a move or by the end-of-round reveal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opened {
    pub coords: Coord2,
    pub is_mine: bool,
    pub adjacent: u8,
}

/// Square grid of cells with the primitive grid operations.
///
/// Every mutating operation is tolerant: out-of-range, opened or flagged targets are no-ops reported as `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
    side: Coord,
    mine_total: CellCount,
    opened_count: CellCount,
}

impl Board {
    /// Allocates an empty `side × side` board that will hold `mine_total` mines once placed.
    pub fn new(side: Coord, mine_total: CellCount) -> Result<Self> {
        GameConfig::new_unchecked(side, mine_total).validate()?;
        Ok(Self {
            cells: Array2::default((side, side).to_nd_index()),
            side,
            mine_total,
            opened_count: 0,
        })
    }

    /// Builds a board with mines at exactly `mine_coords`, duplicates collapsed.
    pub fn from_mine_coords(side: Coord, mine_coords: &[Coord2]) -> Result<Self> {
        if side == 0 {
            return Err(GameError::ZeroSide);
        }
        if mine_coords.iter().any(|&(y, x)| y >= side || x >= side) {
            return Err(GameError::InvalidCoords);
        }

        let mut cells: Array2<Cell> = Array2::default((side, side).to_nd_index());
        for &coords in mine_coords {
            cells[coords.to_nd_index()].is_mine = true;
        }
        // bounded by side², which always fits
        let mine_total = cells.iter().filter(|cell| cell.is_mine).count() as CellCount;

        let mut board = Self::new(side, mine_total)?;
        board.cells = cells;
        board.compute_adjacency_counts();
        Ok(board)
    }

    pub fn side(&self) -> Coord {
        self.side
    }

    pub fn mine_total(&self) -> CellCount {
        self.mine_total
    }

    /// Non-mine cells opened so far.
    pub fn opened_count(&self) -> CellCount {
        self.opened_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        mult(self.side, self.side) - self.mine_total
    }

    pub fn flag_count(&self) -> CellCount {
        self.cells.iter().filter(|cell| cell.flagged).count() as CellCount
    }

    pub fn in_bounds(&self, (y, x): Coord2) -> bool {
        y < self.side && x < self.side
    }

    pub fn cell(&self, coords: Coord2) -> Option<Cell> {
        self.cells.get(coords.to_nd_index()).copied()
    }

    pub fn cells(&self) -> &Array2<Cell> {
        &self.cells
    }

    /// The up-to-8 in-grid neighbours of `coords`.
    pub fn neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.side)
    }

    /// Whether `open_cell` would do anything at `coords`.
    pub fn can_open(&self, coords: Coord2) -> bool {
        self.cell(coords)
            .is_some_and(|cell| !cell.opened && !cell.flagged)
    }

    /// Scatters `mine_total` mines uniformly, never on `excluding`, then recomputes adjacency.
    ///
    /// Uses rejection sampling: a draw that hits an existing mine or the excluded cell is retried. The loop ends
    /// because a valid board always has at least one safe cell.
    pub fn place_mines<R: Rng>(&mut self, rng: &mut R, excluding: Option<Coord2>) {
        self.clear_mines();

        let excluding = excluding.filter(|&coords| self.in_bounds(coords));
        let mut placed: CellCount = 0;
        let mut rejected: u32 = 0;
        while placed < self.mine_total {
            let coords = (
                rng.random_range(0..self.side),
                rng.random_range(0..self.side),
            );
            if Some(coords) == excluding {
                rejected += 1;
                continue;
            }

            let cell = &mut self.cells[coords.to_nd_index()];
            if cell.is_mine {
                rejected += 1;
                continue;
            }
            cell.is_mine = true;
            placed += 1;
        }
        log::debug!(
            "Placed {} mines on a {}x{} board ({} draws rejected), safe cell: {:?}",
            placed,
            self.side,
            self.side,
            rejected,
            excluding
        );

        self.compute_adjacency_counts();
    }

    /// Checks that `mine_coords` names exactly `mine_total` distinct in-range cells.
    pub fn check_layout(&self, mine_coords: &[Coord2]) -> Result<()> {
        if mine_coords.iter().any(|&coords| !self.in_bounds(coords)) {
            return Err(GameError::InvalidCoords);
        }
        // in-range and distinct, so bounded by side²
        let placed = mine_coords.iter().collect::<BTreeSet<_>>().len() as CellCount;
        if placed != self.mine_total {
            return Err(GameError::LayoutMismatch {
                expected: self.mine_total,
                placed,
            });
        }
        Ok(())
    }

    /// Replaces the layout with mines at exactly `mine_coords`. The board is left untouched on error.
    pub fn set_mines(&mut self, mine_coords: &[Coord2]) -> Result<()> {
        self.check_layout(mine_coords)?;
        self.clear_mines();
        for &coords in mine_coords {
            self.cells[coords.to_nd_index()].is_mine = true;
        }
        self.compute_adjacency_counts();
        Ok(())
    }

    fn clear_mines(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.is_mine = false;
            cell.adjacent = 0;
        }
    }

    /// Counts mines around every non-mine cell. Mines keep an adjacency of 0.
    pub fn compute_adjacency_counts(&mut self) {
        for y in 0..self.side {
            for x in 0..self.side {
                let coords = (y, x);
                let adjacent = if self[coords].is_mine {
                    0
                } else {
                    self.neighbors(coords)
                        .filter(|&pos| self[pos].is_mine)
                        .count() as u8
                };
                self.cells[coords.to_nd_index()].adjacent = adjacent;
            }
        }
    }

    /// Opens a single cell without cascading.
    pub fn open_cell(&mut self, coords: Coord2) -> Option<Opened> {
        let cell = self.cells.get_mut(coords.to_nd_index())?;
        if cell.opened || cell.flagged {
            return None;
        }
        cell.opened = true;

        let opened = Opened {
            coords,
            is_mine: cell.is_mine,
            adjacent: cell.adjacent,
        };
        if !opened.is_mine {
            self.opened_count += 1;
        }
        Some(opened)
    }

    /// Opens `start` and, when it has no adjacent mines, the whole connected zero region plus its numbered border.
    ///
    /// Every cell opened is appended to `opened`, the start cell first. Returns the start cell, or `None` when it could
    /// not be opened. A mine at `start` is opened alone.
    pub fn flood_open(&mut self, start: Coord2, opened: &mut Vec<Opened>) -> Option<Opened> {
        let first = self.open_cell(start)?;
        opened.push(first);
        if first.is_mine || first.adjacent != 0 {
            return Some(first);
        }

        let mut stack: Vec<Coord2> = self
            .neighbors(start)
            .filter(|&pos| self.is_enterable(pos))
            .collect();
        log::trace!(
            "Starting flood-fill from {:?}, initial neighbors: {:?}",
            start,
            stack
        );

        while let Some(visit_coords) = stack.pop() {
            // duplicates may sit on the stack, only the first pop opens
            if !self.is_enterable(visit_coords) {
                continue;
            }
            let Some(visit) = self.open_cell(visit_coords) else {
                continue;
            };
            opened.push(visit);
            log::trace!(
                "Flood opened cell at {:?}, mine count: {}",
                visit_coords,
                visit.adjacent
            );

            if visit.adjacent == 0 {
                stack.extend(
                    self.neighbors(visit_coords)
                        .filter(|&pos| self.is_enterable(pos)),
                );
            }
        }

        Some(first)
    }

    fn is_enterable(&self, coords: Coord2) -> bool {
        let cell = self[coords];
        !cell.opened && !cell.flagged && !cell.is_mine
    }

    /// Flips the flag on a closed cell and returns the new flag value.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Option<bool> {
        let cell = self.cells.get_mut(coords.to_nd_index())?;
        if cell.opened {
            return None;
        }
        cell.flagged = !cell.flagged;
        Some(cell.flagged)
    }

    /// All safe cells are open.
    pub fn is_won(&self) -> bool {
        self.opened_count == self.safe_cell_count()
    }

    /// Every flag sits on a mine. Trivially true without flags.
    pub fn flags_on_mines_only(&self) -> bool {
        self.cells
            .iter()
            .filter(|cell| cell.flagged)
            .all(|cell| cell.is_mine)
    }

    /// End-of-round reveal: opens every closed, unflagged cell. On a win, closed mines get flagged instead.
    pub fn reveal_all(&mut self, won: bool) -> Vec<Opened> {
        let mut opened = Vec::new();
        let mut newly_safe: CellCount = 0;

        for ((y, x), cell) in self.cells.indexed_iter_mut() {
            if cell.opened || cell.flagged {
                continue;
            }
            if won && cell.is_mine {
                cell.flagged = true;
                continue;
            }

            cell.opened = true;
            if !cell.is_mine {
                newly_safe += 1;
            }
            opened.push(Opened {
                coords: (y as Coord, x as Coord),
                is_mine: cell.is_mine,
                adjacent: cell.adjacent,
            });
        }

        self.opened_count += newly_safe;
        opened
    }

    /// Closes and unflags every cell and forgets the layout.
    pub fn reset(&mut self) {
        self.cells.fill(Cell::default());
        self.opened_count = 0;
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}
