//! Resolved territory ownership across all cities.
//!
//! Overlapping claims resolve deterministically: a city's own tile beats any
//! radius claim, then the higher city level wins, then the lower city id.

use std::collections::BTreeMap;

use marchlands_protocol::{CityId, PlayerId, TerritoryTile, Tile, CITY_TILE_PRIORITY};

use crate::City;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Claim {
    pub owner: PlayerId,
    pub city: CityId,
    pub priority: u32,
}

impl Claim {
    fn beats(&self, other: &Claim) -> bool {
        (self.priority, std::cmp::Reverse(self.city)) > (other.priority, std::cmp::Reverse(other.city))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TerritoryMap {
    claims: BTreeMap<Tile, Claim>,
}

impl TerritoryMap {
    pub fn build<'a>(cities: impl IntoIterator<Item = (CityId, &'a City)>) -> Self {
        let mut map = Self::default();
        for (id, city) in cities {
            map.offer(
                city.pos,
                Claim {
                    owner: city.owner,
                    city: id,
                    priority: CITY_TILE_PRIORITY,
                },
            );
            for tile in &city.claimed {
                map.offer(
                    *tile,
                    Claim {
                        owner: city.owner,
                        city: id,
                        priority: city.level,
                    },
                );
            }
        }
        map
    }

    fn offer(&mut self, tile: Tile, claim: Claim) {
        match self.claims.get(&tile) {
            Some(existing) if !claim.beats(existing) => {}
            _ => {
                self.claims.insert(tile, claim);
            }
        }
    }

    pub fn claim_at(&self, tile: Tile) -> Option<&Claim> {
        self.claims.get(&tile)
    }

    pub fn owner_at(&self, tile: Tile) -> Option<PlayerId> {
        self.claims.get(&tile).map(|c| c.owner)
    }

    /// Whether any tile within one step of `tile` (itself included) belongs to `owner`.
    pub fn borders(&self, tile: Tile, owner: PlayerId) -> bool {
        tile.square(1).any(|t| self.owner_at(t) == Some(owner))
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn tiles(&self) -> Vec<TerritoryTile> {
        self.claims
            .iter()
            .map(|(pos, claim)| TerritoryTile {
                pos: *pos,
                owner: claim.owner,
                city: claim.city,
                priority: claim.priority,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(owner: u8, x: i32, y: i32, level: u32) -> City {
        let mut city = City::new(PlayerId(owner), Tile::new(x, y), 100);
        for _ in 1..level {
            city.upgrade(100);
        }
        city
    }

    #[test]
    fn higher_level_wins_overlap() {
        let weak = city(0, 10, 10, 1);
        let strong = city(1, 12, 10, 2);
        let map = TerritoryMap::build([(CityId::new(1), &weak), (CityId::new(2), &strong)]);
        assert_eq!(map.owner_at(Tile::new(11, 10)), Some(PlayerId(1)));
        assert_eq!(map.owner_at(Tile::new(9, 10)), Some(PlayerId(0)));
    }

    #[test]
    fn equal_level_goes_to_lower_city_id_regardless_of_order() {
        let a = city(0, 10, 10, 1);
        let b = city(1, 12, 10, 1);
        let forward = TerritoryMap::build([(CityId::new(1), &a), (CityId::new(2), &b)]);
        let backward = TerritoryMap::build([(CityId::new(2), &b), (CityId::new(1), &a)]);
        assert_eq!(forward.owner_at(Tile::new(11, 10)), Some(PlayerId(0)));
        assert_eq!(forward, backward);
    }

    #[test]
    fn city_tile_beats_any_radius_claim() {
        let big = city(0, 10, 10, 7);
        let small = city(1, 12, 10, 1);
        let map = TerritoryMap::build([(CityId::new(1), &big), (CityId::new(2), &small)]);
        let claim = map.claim_at(Tile::new(12, 10)).copied();
        assert_eq!(claim.map(|c| c.owner), Some(PlayerId(1)));
        assert_eq!(claim.map(|c| c.priority), Some(CITY_TILE_PRIORITY));
    }

    #[test]
    fn borders_detect_adjacent_territory() {
        let a = city(0, 10, 10, 1);
        let map = TerritoryMap::build([(CityId::new(1), &a)]);
        assert!(map.borders(Tile::new(12, 12), PlayerId(0)));
        assert!(!map.borders(Tile::new(13, 10), PlayerId(0)));
    }
}
