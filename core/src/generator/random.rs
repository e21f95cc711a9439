use rand::{SeedableRng, rngs::SmallRng};

use super::*;

/// Uniformly random layouts from a seeded [`SmallRng`]. Each call draws a fresh, independent layout.
#[derive(Clone, Debug)]
pub struct RandomPlacer {
    rng: SmallRng,
}

impl RandomPlacer {
    pub fn new(seed: u64) -> Self {
        log::debug!("seed: {}", seed);
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl MinePlacer for RandomPlacer {
    fn place(&mut self, board: &mut Board, safe: Option<Coord2>) -> Result<()> {
        board.place_mines(&mut self.rng, safe);
        Ok(())
    }
}
