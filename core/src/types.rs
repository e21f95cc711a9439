/// Single coordinate axis used for the board side and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(y, x)`, row first.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Offsets `(dy, dx)` of the 8-neighbourhood, clockwise from north.
const DISPLACEMENTS: [(i8, i8); 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

/// Applies `delta` to `coords`, returning a value only when it remains inside a `side × side` grid.
fn apply_delta(coords: Coord2, delta: (i8, i8), side: Coord) -> Option<Coord2> {
    let (y, x) = coords;
    let (dy, dx) = delta;

    let next_y = y.checked_add_signed(dy)?;
    if next_y >= side {
        return None;
    }

    let next_x = x.checked_add_signed(dx)?;
    if next_x >= side {
        return None;
    }

    Some((next_y, next_x))
}

/// Iterates the in-grid neighbours of a cell, never wrapping around edges.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord2,
    side: Coord,
    index: u8,
}

impl NeighborIter {
    pub(crate) fn new(center: Coord2, side: Coord) -> Self {
        Self {
            center,
            side,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item = apply_delta(self.center, DISPLACEMENTS[self.index as usize], self.side);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}
