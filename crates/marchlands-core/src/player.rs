use serde::{Deserialize, Serialize};

use marchlands_protocol::{CityId, PlayerId, UnitId};

use crate::{Behavior, DiplomacyLedger, GameRng};

const NAME_PREFIXES: [&str; 8] = [
    "Great", "Mighty", "Ancient", "Heroic", "Golden", "Iron", "Silver", "Bronze",
];
const NAME_NOUNS: [&str; 8] = [
    "Kingdom", "Empire", "Realm", "Dynasty", "Nation", "Dominion", "Republic", "Clan",
];

/// `"<Prefix> <Noun> (<Profile>)"`, e.g. "Iron Realm (Warrior)".
pub fn generate_player_name(rng: &mut GameRng, behavior: Behavior) -> String {
    let prefix = rng.choose(&NAME_PREFIXES).copied().unwrap_or("Great");
    let noun = rng.choose(&NAME_NOUNS).copied().unwrap_or("Kingdom");
    format!("{prefix} {noun} ({behavior})")
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub coins: i32,
    /// Owned cities in acquisition order.
    pub cities: Vec<CityId>,
    /// Owned units in acquisition order.
    pub units: Vec<UnitId>,
    pub behavior: Behavior,
    pub diplomacy: DiplomacyLedger,
    pub is_human: bool,
    /// True only while it is this player's turn.
    pub is_active: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: String, behavior: Behavior, coins: i32) -> Self {
        Self {
            id,
            name,
            coins,
            cities: Vec::new(),
            units: Vec::new(),
            behavior,
            diplomacy: DiplomacyLedger::new(),
            is_human: false,
            is_active: false,
        }
    }

    #[inline]
    pub fn can_afford(&self, cost: i32) -> bool {
        self.coins >= cost
    }

    /// Deducts `amount` if affordable.
    pub fn spend(&mut self, amount: i32) -> bool {
        if !self.can_afford(amount) {
            return false;
        }
        self.coins -= amount;
        true
    }

    pub fn remove_unit(&mut self, unit: UnitId) {
        self.units.retain(|u| *u != unit);
    }

    pub fn remove_city(&mut self, city: CityId) {
        self.cities.retain(|c| *c != city);
    }
}
