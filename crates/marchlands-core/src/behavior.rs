use serde::{Deserialize, Deserializer, Serialize, Serializer};

use marchlands_protocol::{ActionKind, UnitKind};

/// Advisory play style attached to a player.
///
/// The rules engine never reads this; decision sources may use the weights
/// to bias which legal action they pick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Behavior {
    Defender,
    Warrior,
    Expansionist,
    Economist,
    #[default]
    Balanced,
}

/// Per-action-kind weights, 1.0 being neutral.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActionWeights {
    pub upgrade_city: f64,
    pub buy_unit: f64,
    pub move_unit: f64,
    pub attack_unit: f64,
    pub found_city: f64,
    pub conquer_city: f64,
}

/// Per-unit-type purchase preferences, 1.0 being neutral.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitPreferences {
    pub soldier: f64,
    pub knight: f64,
    pub giant: f64,
    pub dragon: f64,
    pub colonizer: f64,
}

impl ActionWeights {
    pub const NEUTRAL: Self = Self {
        upgrade_city: 1.0,
        buy_unit: 1.0,
        move_unit: 1.0,
        attack_unit: 1.0,
        found_city: 1.0,
        conquer_city: 1.0,
    };

    pub fn get(&self, kind: ActionKind) -> f64 {
        match kind {
            ActionKind::UpgradeCity => self.upgrade_city,
            ActionKind::BuyUnit => self.buy_unit,
            ActionKind::MoveUnit => self.move_unit,
            ActionKind::AttackUnit => self.attack_unit,
            ActionKind::FoundCity => self.found_city,
            ActionKind::ConquerCity => self.conquer_city,
            _ => 0.0,
        }
    }
}

impl UnitPreferences {
    pub const NEUTRAL: Self = Self {
        soldier: 1.0,
        knight: 1.0,
        giant: 1.0,
        dragon: 1.0,
        colonizer: 1.0,
    };

    pub fn get(&self, kind: UnitKind) -> f64 {
        match kind {
            UnitKind::Soldier => self.soldier,
            UnitKind::Knight => self.knight,
            UnitKind::Giant => self.giant,
            UnitKind::Dragon => self.dragon,
            UnitKind::Colonizer => self.colonizer,
        }
    }
}

impl Behavior {
    pub const ALL: [Behavior; 5] = [
        Behavior::Defender,
        Behavior::Warrior,
        Behavior::Expansionist,
        Behavior::Economist,
        Behavior::Balanced,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Behavior::Defender => "Defender",
            Behavior::Warrior => "Warrior",
            Behavior::Expansionist => "Expansionist",
            Behavior::Economist => "Economist",
            Behavior::Balanced => "Balanced",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Behavior::Defender => {
                "Focuses on city defense and upgrading, prefers defensive units"
            }
            Behavior::Warrior => {
                "Focuses on military might, prefers offensive units and conquest"
            }
            Behavior::Expansionist => {
                "Focuses on rapidly expanding territory through colonization"
            }
            Behavior::Economist => "Focuses on city development and economic growth",
            Behavior::Balanced => "Takes a balanced approach to all aspects of the game",
        }
    }

    pub const fn action_weights(self) -> ActionWeights {
        match self {
            Behavior::Defender => ActionWeights {
                upgrade_city: 2.0,
                buy_unit: 1.5,
                move_unit: 0.5,
                attack_unit: 0.3,
                found_city: 0.7,
                conquer_city: 0.2,
            },
            Behavior::Warrior => ActionWeights {
                upgrade_city: 0.5,
                buy_unit: 2.0,
                move_unit: 1.5,
                attack_unit: 2.0,
                found_city: 0.5,
                conquer_city: 2.0,
            },
            Behavior::Expansionist => ActionWeights {
                upgrade_city: 0.7,
                buy_unit: 1.0,
                move_unit: 1.3,
                attack_unit: 0.5,
                found_city: 2.0,
                conquer_city: 1.0,
            },
            Behavior::Economist => ActionWeights {
                upgrade_city: 2.0,
                buy_unit: 0.7,
                move_unit: 0.7,
                attack_unit: 0.3,
                found_city: 1.5,
                conquer_city: 0.3,
            },
            Behavior::Balanced => ActionWeights::NEUTRAL,
        }
    }

    pub const fn unit_preferences(self) -> UnitPreferences {
        match self {
            Behavior::Defender => UnitPreferences {
                soldier: 1.5,
                knight: 1.0,
                giant: 2.0,
                dragon: 1.0,
                colonizer: 0.5,
            },
            Behavior::Warrior => UnitPreferences {
                soldier: 1.2,
                knight: 2.0,
                giant: 1.0,
                dragon: 2.0,
                colonizer: 0.3,
            },
            Behavior::Expansionist => UnitPreferences {
                soldier: 0.7,
                knight: 0.7,
                giant: 0.5,
                dragon: 0.5,
                colonizer: 2.0,
            },
            Behavior::Economist => UnitPreferences {
                soldier: 0.5,
                knight: 0.5,
                giant: 0.5,
                dragon: 0.3,
                colonizer: 1.8,
            },
            Behavior::Balanced => UnitPreferences::NEUTRAL,
        }
    }

    /// Case-insensitive lookup. Unknown names fall back to Balanced.
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "defender" => Behavior::Defender,
            "warrior" => Behavior::Warrior,
            "expansionist" => Behavior::Expansionist,
            "economist" => Behavior::Economist,
            _ => Behavior::Balanced,
        }
    }
}

impl std::fmt::Display for Behavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Behavior {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Behavior {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&name))
    }
}
