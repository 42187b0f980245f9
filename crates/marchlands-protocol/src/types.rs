use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The fixed unit catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum UnitKind {
    #[default]
    Soldier,
    Knight,
    Giant,
    Dragon,
    Colonizer,
}

/// Static stats for one catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct UnitStats {
    pub cost: i32,
    pub hp: i32,
    pub attack: i32,
    pub movement: i32,
    pub symbol: char,
}

impl UnitKind {
    pub const ALL: [UnitKind; 5] = [
        UnitKind::Soldier,
        UnitKind::Knight,
        UnitKind::Giant,
        UnitKind::Dragon,
        UnitKind::Colonizer,
    ];

    pub const fn stats(self) -> UnitStats {
        match self {
            UnitKind::Soldier => UnitStats {
                cost: 3,
                hp: 5,
                attack: 2,
                movement: 1,
                symbol: 'S',
            },
            UnitKind::Knight => UnitStats {
                cost: 7,
                hp: 8,
                attack: 4,
                movement: 2,
                symbol: 'K',
            },
            UnitKind::Giant => UnitStats {
                cost: 12,
                hp: 30,
                attack: 3,
                movement: 1,
                symbol: 'O',
            },
            UnitKind::Dragon => UnitStats {
                cost: 30,
                hp: 25,
                attack: 7,
                movement: 3,
                symbol: 'D',
            },
            UnitKind::Colonizer => UnitStats {
                cost: 10,
                hp: 3,
                attack: 1,
                movement: 1,
                symbol: 'C',
            },
        }
    }

    #[inline]
    pub const fn cost(self) -> i32 {
        self.stats().cost
    }

    /// Weight of one unit of this kind in the score table.
    pub const fn score_weight(self) -> i32 {
        match self {
            UnitKind::Soldier => 1,
            UnitKind::Knight => 2,
            UnitKind::Giant => 3,
            UnitKind::Dragon => 5,
            UnitKind::Colonizer => 0,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            UnitKind::Soldier => "soldier",
            UnitKind::Knight => "knight",
            UnitKind::Giant => "giant",
            UnitKind::Dragon => "dragon",
            UnitKind::Colonizer => "colonizer",
        }
    }

    /// Case-insensitive lookup. Unknown names fall back to soldier.
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "soldier" => UnitKind::Soldier,
            "knight" => UnitKind::Knight,
            "giant" => UnitKind::Giant,
            "dragon" => UnitKind::Dragon,
            "colonizer" => UnitKind::Colonizer,
            _ => UnitKind::Soldier,
        }
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for UnitKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for UnitKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_matches_fixed_table() {
        let table = [
            (UnitKind::Soldier, 3, 5, 2, 1),
            (UnitKind::Knight, 7, 8, 4, 2),
            (UnitKind::Giant, 12, 30, 3, 1),
            (UnitKind::Dragon, 30, 25, 7, 3),
            (UnitKind::Colonizer, 10, 3, 1, 1),
        ];
        for (kind, cost, hp, attack, movement) in table {
            let stats = kind.stats();
            assert_eq!(
                (stats.cost, stats.hp, stats.attack, stats.movement),
                (cost, hp, attack, movement),
                "{kind}"
            );
        }
    }

    #[test]
    fn unknown_names_default_to_soldier() {
        assert_eq!(UnitKind::parse_lenient("Wizard"), UnitKind::Soldier);
        assert_eq!(UnitKind::parse_lenient("KNIGHT"), UnitKind::Knight);

        let kind: UnitKind = serde_json::from_str("\"catapult\"").unwrap();
        assert_eq!(kind, UnitKind::Soldier);
        assert_eq!(kind.cost(), 3);
    }
}
