use serde::{Deserialize, Serialize};

/// Integer coordinates on the square game grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
}

impl Tile {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Max of the axis deltas; used for movement, founding and territory radius.
    #[inline]
    pub fn chebyshev(self, other: Tile) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Straight-line distance; used for attack range.
    #[inline]
    pub fn euclidean(self, other: Tile) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    #[inline]
    pub fn in_bounds(self, grid_size: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < grid_size && self.y < grid_size
    }

    /// Every tile within Chebyshev `radius`, row-major, including `self`.
    pub fn square(self, radius: i32) -> impl Iterator<Item = Tile> {
        (-radius..=radius)
            .flat_map(move |dy| (-radius..=radius).map(move |dx| Tile::new(self.x + dx, self.y + dy)))
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}
