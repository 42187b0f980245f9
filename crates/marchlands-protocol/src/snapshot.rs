use serde::{Deserialize, Serialize};

use crate::{CityId, PlayerId, Tile, UnitId, UnitKind};

/// Claim priority of a city's own tile; beats any radius claim.
pub const CITY_TILE_PRIORITY: u32 = u32::MAX;

/// Read-only view of the game after an apply, sufficient to redraw the board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub round: u32,
    pub grid_size: i32,
    pub current_player: Option<PlayerId>,
    pub winner: Option<PlayerId>,
    pub players: Vec<PlayerSnapshot>,
    pub units: Vec<UnitSnapshot>,
    pub cities: Vec<CitySnapshot>,
    /// Resolved territory, one entry per claimed tile, ordered by tile.
    pub territory: Vec<TerritoryTile>,
    /// Score table sorted descending.
    pub rankings: Vec<ScoreEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub behavior: String,
    pub coins: i32,
    pub score: i32,
    pub territory_size: i32,
    pub active: bool,
    pub is_human: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub owner: PlayerId,
    pub kind: UnitKind,
    pub pos: Tile,
    pub hp: i32,
    pub max_hp: i32,
    pub has_moved: bool,
    pub has_attacked: bool,
    pub has_acted: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitySnapshot {
    pub id: CityId,
    pub owner: PlayerId,
    pub pos: Tile,
    pub level: u32,
    pub population: u32,
    pub territory_size: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryTile {
    pub pos: Tile,
    pub owner: PlayerId,
    pub city: CityId,
    pub priority: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub player: PlayerId,
    pub name: String,
    pub score: i32,
}

impl GameSnapshot {
    pub fn territory_owner(&self, pos: Tile) -> Option<PlayerId> {
        self.territory.iter().find(|t| t.pos == pos).map(|t| t.owner)
    }

    pub fn unit_at(&self, pos: Tile) -> Option<&UnitSnapshot> {
        self.units.iter().find(|u| u.pos == pos)
    }

    pub fn city_at(&self, pos: Tile) -> Option<&CitySnapshot> {
        self.cities.iter().find(|c| c.pos == pos)
    }
}
