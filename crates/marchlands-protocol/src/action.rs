use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CityId, PlayerId, UnitId, UnitKind};

/// Every action a player (human or autonomous) can submit. Fully serializable.
///
/// Wire form is `{"action": "<kind>", "parameters": {...}}` with camelCase
/// parameter names, matching what external decision sources are told to emit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "action",
    content = "parameters",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    // City actions
    UpgradeCity {
        city_id: CityId,
    },
    BuyUnit {
        city_id: CityId,
        #[serde(default)]
        unit_type: UnitKind,
    },

    // Unit actions
    MoveUnit {
        #[serde(alias = "id")]
        unit_id: UnitId,
        x: i32,
        y: i32,
    },
    AttackUnit {
        #[serde(alias = "id")]
        unit_id: UnitId,
        x: i32,
        y: i32,
    },
    FoundCity {
        #[serde(alias = "id")]
        unit_id: UnitId,
    },
    ConquerCity {
        #[serde(alias = "id")]
        unit_id: UnitId,
    },

    EndTurn {},

    // Diplomacy side-actions, handled out-of-band from the move queue
    AcceptPeaceTreaty {
        player_id: PlayerId,
    },
    RejectPeaceTreaty {
        player_id: PlayerId,
    },
}

impl Action {
    pub const fn end_turn() -> Self {
        Action::EndTurn {}
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::UpgradeCity { .. } => ActionKind::UpgradeCity,
            Action::BuyUnit { .. } => ActionKind::BuyUnit,
            Action::MoveUnit { .. } => ActionKind::MoveUnit,
            Action::AttackUnit { .. } => ActionKind::AttackUnit,
            Action::FoundCity { .. } => ActionKind::FoundCity,
            Action::ConquerCity { .. } => ActionKind::ConquerCity,
            Action::EndTurn {} => ActionKind::EndTurn,
            Action::AcceptPeaceTreaty { .. } => ActionKind::AcceptPeaceTreaty,
            Action::RejectPeaceTreaty { .. } => ActionKind::RejectPeaceTreaty,
        }
    }

    #[inline]
    pub fn is_end_turn(&self) -> bool {
        matches!(self, Action::EndTurn {})
    }
}

/// Discriminant of [`Action`], used as the key of menus, weights and failure records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    UpgradeCity,
    BuyUnit,
    MoveUnit,
    AttackUnit,
    FoundCity,
    ConquerCity,
    EndTurn,
    AcceptPeaceTreaty,
    RejectPeaceTreaty,
}

impl ActionKind {
    /// Kinds that consume the move queue (diplomacy side-actions excluded).
    pub const MOVES: [ActionKind; 7] = [
        ActionKind::UpgradeCity,
        ActionKind::BuyUnit,
        ActionKind::MoveUnit,
        ActionKind::AttackUnit,
        ActionKind::FoundCity,
        ActionKind::ConquerCity,
        ActionKind::EndTurn,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ActionKind::UpgradeCity => "upgradeCity",
            ActionKind::BuyUnit => "buyUnit",
            ActionKind::MoveUnit => "moveUnit",
            ActionKind::AttackUnit => "attackUnit",
            ActionKind::FoundCity => "foundCity",
            ActionKind::ConquerCity => "conquerCity",
            ActionKind::EndTurn => "endTurn",
            ActionKind::AcceptPeaceTreaty => "acceptPeaceTreaty",
            ActionKind::RejectPeaceTreaty => "rejectPeaceTreaty",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "upgradeCity" => Some(ActionKind::UpgradeCity),
            "buyUnit" => Some(ActionKind::BuyUnit),
            "moveUnit" => Some(ActionKind::MoveUnit),
            "attackUnit" => Some(ActionKind::AttackUnit),
            "foundCity" => Some(ActionKind::FoundCity),
            "conquerCity" => Some(ActionKind::ConquerCity),
            "endTurn" => Some(ActionKind::EndTurn),
            "acceptPeaceTreaty" => Some(ActionKind::AcceptPeaceTreaty),
            "rejectPeaceTreaty" => Some(ActionKind::RejectPeaceTreaty),
            _ => None,
        }
    }

    #[inline]
    pub fn is_diplomacy(self) -> bool {
        matches!(
            self,
            ActionKind::AcceptPeaceTreaty | ActionKind::RejectPeaceTreaty
        )
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionParseError {
    #[error("unknown action kind `{0}`")]
    UnknownKind(String),
    #[error("invalid parameters for {kind}: {message}")]
    InvalidParameters { kind: ActionKind, message: String },
}

/// An action exactly as an untrusted decision source proposed it.
///
/// Kept loosely typed until [`ProposedAction::parse`] so one malformed entry
/// does not poison the rest of a multi-action plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProposedAction {
    pub action: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl ProposedAction {
    pub fn new(action: impl Into<String>, parameters: serde_json::Value) -> Self {
        Self {
            action: action.into(),
            parameters,
        }
    }

    pub fn end_turn() -> Self {
        Self::new(ActionKind::EndTurn.name(), serde_json::json!({}))
    }

    /// Kind named by the proposal, if it is part of the vocabulary.
    pub fn kind(&self) -> Option<ActionKind> {
        ActionKind::from_name(&self.action)
    }

    pub fn parse(&self) -> Result<Action, ActionParseError> {
        let kind = self
            .kind()
            .ok_or_else(|| ActionParseError::UnknownKind(self.action.clone()))?;

        let parameters = match &self.parameters {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            other => other.clone(),
        };
        let tagged = serde_json::json!({ "action": kind.name(), "parameters": parameters });

        serde_json::from_value(tagged).map_err(|err| ActionParseError::InvalidParameters {
            kind,
            message: err.to_string(),
        })
    }
}

impl From<&Action> for ProposedAction {
    fn from(action: &Action) -> Self {
        let value = serde_json::to_value(action).unwrap_or_default();
        Self {
            action: action.kind().name().to_string(),
            parameters: value
                .get("parameters")
                .cloned()
                .unwrap_or_else(|| serde_json::json!({})),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn wire_form_uses_camel_case_parameters() {
        let action = Action::BuyUnit {
            city_id: CityId::new(1),
            unit_type: UnitKind::Colonizer,
        };
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(
            value,
            json!({"action": "buyUnit", "parameters": {"cityId": 1, "unitType": "colonizer"}})
        );
    }

    #[test]
    fn proposals_parse_with_aliases_and_defaults() {
        let moved = ProposedAction::new("moveUnit", json!({"id": 4, "x": 2, "y": 3}));
        assert_eq!(
            moved.parse().unwrap(),
            Action::MoveUnit {
                unit_id: UnitId::new(4),
                x: 2,
                y: 3
            }
        );

        let bought = ProposedAction::new("buyUnit", json!({"cityId": 9}));
        assert_eq!(
            bought.parse().unwrap(),
            Action::BuyUnit {
                city_id: CityId::new(9),
                unit_type: UnitKind::Soldier
            }
        );

        let ended = ProposedAction::new("endTurn", serde_json::Value::Null);
        assert!(ended.parse().unwrap().is_end_turn());
    }

    #[test]
    fn malformed_proposals_are_typed_errors() {
        let unknown = ProposedAction::new("declareWar", json!({"playerId": 1}));
        assert_eq!(
            unknown.parse(),
            Err(ActionParseError::UnknownKind("declareWar".into()))
        );

        let missing = ProposedAction::new("attackUnit", json!({"unitId": 1}));
        assert!(matches!(
            missing.parse(),
            Err(ActionParseError::InvalidParameters {
                kind: ActionKind::AttackUnit,
                ..
            })
        ));
    }

    #[test]
    fn action_converts_back_to_a_proposal() {
        let action = Action::ConquerCity {
            unit_id: UnitId::new(5),
        };
        let proposal = ProposedAction::from(&action);
        assert_eq!(proposal.action, "conquerCity");
        assert_eq!(proposal.parse().unwrap(), action);
    }
}
