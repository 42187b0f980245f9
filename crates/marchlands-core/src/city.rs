use serde::{Deserialize, Serialize};

use marchlands_protocol::{CityId, CitySnapshot, PlayerId, Tile};

/// Upgrade cost per current level.
pub const UPGRADE_COST_PER_LEVEL: i32 = 50;
pub const POPULATION_PER_LEVEL: u32 = 10;

/// Influence radius: 1 for levels 1-3, then steps up at 4, 7 and 10.
pub const fn radius_for_level(level: u32) -> i32 {
    match level {
        0..=3 => 1,
        4..=6 => 2,
        7..=9 => 3,
        _ => 4,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub owner: PlayerId,
    pub pos: Tile,
    pub level: u32,
    /// In-grid tiles claimed by this city, excluding its own tile.
    pub claimed: Vec<Tile>,
}

impl City {
    pub fn new(owner: PlayerId, pos: Tile, grid_size: i32) -> Self {
        let mut city = Self {
            owner,
            pos,
            level: 1,
            claimed: Vec::new(),
        };
        city.recompute_territory(grid_size);
        city
    }

    #[inline]
    pub fn radius(&self) -> i32 {
        radius_for_level(self.level)
    }

    #[inline]
    pub fn upgrade_cost(&self) -> i32 {
        self.level as i32 * UPGRADE_COST_PER_LEVEL
    }

    #[inline]
    pub fn population(&self) -> u32 {
        self.level * POPULATION_PER_LEVEL
    }

    /// Claimed tiles plus the city tile itself.
    #[inline]
    pub fn territory_size(&self) -> i32 {
        self.claimed.len() as i32 + 1
    }

    pub fn recompute_territory(&mut self, grid_size: i32) {
        let center = self.pos;
        self.claimed = center
            .square(self.radius())
            .filter(|tile| *tile != center && tile.in_bounds(grid_size))
            .collect();
    }

    pub fn upgrade(&mut self, grid_size: i32) {
        self.level += 1;
        self.recompute_territory(grid_size);
    }

    /// Conquest costs one level (floor 1) and re-claims under the new owner.
    pub fn transfer(&mut self, new_owner: PlayerId, grid_size: i32) {
        self.owner = new_owner;
        self.level = self.level.saturating_sub(1).max(1);
        self.recompute_territory(grid_size);
    }

    pub fn snapshot(&self, id: CityId) -> CitySnapshot {
        CitySnapshot {
            id,
            owner: self.owner,
            pos: self.pos,
            level: self.level,
            population: self.population(),
            territory_size: self.territory_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_steps_at_four_seven_ten() {
        let expected = [
            (1, 1),
            (3, 1),
            (4, 2),
            (6, 2),
            (7, 3),
            (9, 3),
            (10, 4),
            (15, 4),
        ];
        for (level, radius) in expected {
            assert_eq!(radius_for_level(level), radius, "level {level}");
        }
    }

    #[test]
    fn upgrade_cost_is_fifty_per_level() {
        let mut city = City::new(PlayerId(0), Tile::new(50, 50), 100);
        for level in 1..12 {
            assert_eq!(city.level, level);
            assert_eq!(city.upgrade_cost(), 50 * level as i32);
            city.upgrade(100);
        }
    }

    #[test]
    fn territory_is_clipped_to_the_grid() {
        let inland = City::new(PlayerId(0), Tile::new(5, 5), 10);
        assert_eq!(inland.territory_size(), 9);

        let corner = City::new(PlayerId(0), Tile::new(0, 0), 10);
        assert_eq!(corner.claimed.len(), 3);
        assert_eq!(corner.territory_size(), 4);
    }

    #[test]
    fn transfer_drops_a_level_and_shrinks_territory() {
        let mut city = City::new(PlayerId(0), Tile::new(20, 20), 100);
        for _ in 0..3 {
            city.upgrade(100);
        }
        assert_eq!((city.level, city.territory_size()), (4, 25));

        city.transfer(PlayerId(1), 100);
        assert_eq!(city.owner, PlayerId(1));
        assert_eq!((city.level, city.territory_size()), (3, 9));

        let mut fresh = City::new(PlayerId(0), Tile::new(3, 3), 100);
        fresh.transfer(PlayerId(2), 100);
        assert_eq!(fresh.level, 1);
    }
}
