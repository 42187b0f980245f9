use serde::{Deserialize, Serialize};

use crate::{Action, ActionKind, CityId, PlayerId, Tile, UnitId, UnitKind};

/// The exhaustive set of currently legal parameterizations, grouped by kind.
///
/// Computed fresh from game state; never cached across an apply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMenu {
    pub upgrade_city: Vec<UpgradeOption>,
    pub buy_unit: Vec<PurchaseOption>,
    pub move_unit: Vec<MoveOption>,
    pub attack_unit: Vec<AttackOption>,
    pub found_city: Vec<FoundOption>,
    pub conquer_city: Vec<ConquerOption>,
    /// Always true; present so the serialized menu lists every kind.
    pub end_turn: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeOption {
    pub city_id: CityId,
    pub level: u32,
    pub cost: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOption {
    pub city_id: CityId,
    pub position: Tile,
    pub affordable: Vec<UnitKind>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOption {
    pub unit_id: UnitId,
    pub unit_type: UnitKind,
    pub position: Tile,
    pub movement: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackOption {
    pub unit_id: UnitId,
    pub unit_type: UnitKind,
    pub position: Tile,
    pub targets: Vec<AttackTarget>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackTarget {
    pub unit_id: UnitId,
    pub owner: PlayerId,
    pub unit_type: UnitKind,
    pub position: Tile,
    pub hp: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundOption {
    pub unit_id: UnitId,
    pub position: Tile,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConquerOption {
    pub unit_id: UnitId,
    pub city_id: CityId,
    pub city_owner: PlayerId,
    pub position: Tile,
}

impl ActionMenu {
    /// An empty menu that still offers endTurn.
    pub fn end_turn_only() -> Self {
        Self {
            end_turn: true,
            ..Self::default()
        }
    }

    /// True when endTurn is the only legal action.
    pub fn only_end_turn(&self) -> bool {
        self.upgrade_city.is_empty()
            && self.buy_unit.is_empty()
            && self.move_unit.is_empty()
            && self.attack_unit.is_empty()
            && self.found_city.is_empty()
            && self.conquer_city.is_empty()
    }

    /// Kinds with at least one legal parameterization, endTurn last.
    pub fn available_kinds(&self) -> Vec<ActionKind> {
        let mut kinds = Vec::new();
        if !self.upgrade_city.is_empty() {
            kinds.push(ActionKind::UpgradeCity);
        }
        if !self.buy_unit.is_empty() {
            kinds.push(ActionKind::BuyUnit);
        }
        if !self.move_unit.is_empty() {
            kinds.push(ActionKind::MoveUnit);
        }
        if !self.attack_unit.is_empty() {
            kinds.push(ActionKind::AttackUnit);
        }
        if !self.found_city.is_empty() {
            kinds.push(ActionKind::FoundCity);
        }
        if !self.conquer_city.is_empty() {
            kinds.push(ActionKind::ConquerCity);
        }
        kinds.push(ActionKind::EndTurn);
        kinds
    }

    pub fn move_option(&self, unit_id: UnitId) -> Option<&MoveOption> {
        self.move_unit.iter().find(|o| o.unit_id == unit_id)
    }

    pub fn attack_option(&self, unit_id: UnitId) -> Option<&AttackOption> {
        self.attack_unit.iter().find(|o| o.unit_id == unit_id)
    }

    /// Menu-level membership: whether the action's *entity* parameters are offered.
    ///
    /// Per-tile reachability for moves is checked at apply time, not here.
    pub fn offers(&self, action: &Action) -> bool {
        match action {
            Action::UpgradeCity { city_id } => {
                self.upgrade_city.iter().any(|o| o.city_id == *city_id)
            }
            Action::BuyUnit { city_id, unit_type } => self
                .buy_unit
                .iter()
                .any(|o| o.city_id == *city_id && o.affordable.contains(unit_type)),
            Action::MoveUnit { unit_id, .. } => self.move_option(*unit_id).is_some(),
            Action::AttackUnit { unit_id, x, y } => {
                self.attack_option(*unit_id).is_some_and(|o| {
                    o.targets
                        .iter()
                        .any(|t| t.position == Tile::new(*x, *y))
                })
            }
            Action::FoundCity { unit_id } => {
                self.found_city.iter().any(|o| o.unit_id == *unit_id)
            }
            Action::ConquerCity { unit_id } => {
                self.conquer_city.iter().any(|o| o.unit_id == *unit_id)
            }
            Action::EndTurn {} => true,
            Action::AcceptPeaceTreaty { .. } | Action::RejectPeaceTreaty { .. } => false,
        }
    }

    /// One-line-per-kind summary, used in logs and prompts.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for option in &self.upgrade_city {
            lines.push(format!(
                "upgradeCity cityId={} (level {} -> {}, cost {})",
                option.city_id,
                option.level,
                option.level + 1,
                option.cost
            ));
        }
        for option in &self.buy_unit {
            let kinds: Vec<&str> = option.affordable.iter().map(|k| k.name()).collect();
            lines.push(format!(
                "buyUnit cityId={} at {} types=[{}]",
                option.city_id,
                option.position,
                kinds.join(", ")
            ));
        }
        for option in &self.move_unit {
            lines.push(format!(
                "moveUnit unitId={} ({}) at {} movement {}",
                option.unit_id, option.unit_type, option.position, option.movement
            ));
        }
        for option in &self.attack_unit {
            let targets: Vec<String> = option
                .targets
                .iter()
                .map(|t| format!("{} of player {} at {} hp {}", t.unit_type, t.owner, t.position, t.hp))
                .collect();
            lines.push(format!(
                "attackUnit unitId={} at {} targets=[{}]",
                option.unit_id,
                option.position,
                targets.join("; ")
            ));
        }
        for option in &self.found_city {
            lines.push(format!(
                "foundCity unitId={} at {}",
                option.unit_id, option.position
            ));
        }
        for option in &self.conquer_city {
            lines.push(format!(
                "conquerCity unitId={} on city {} of player {} at {}",
                option.unit_id, option.city_id, option.city_owner, option.position
            ));
        }
        lines.push("endTurn".to_string());
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_menu() -> ActionMenu {
        ActionMenu {
            buy_unit: vec![PurchaseOption {
                city_id: CityId::new(1),
                position: Tile::new(5, 5),
                affordable: vec![UnitKind::Soldier, UnitKind::Knight],
            }],
            attack_unit: vec![AttackOption {
                unit_id: UnitId::new(2),
                unit_type: UnitKind::Soldier,
                position: Tile::new(0, 0),
                targets: vec![AttackTarget {
                    unit_id: UnitId::new(9),
                    owner: PlayerId(1),
                    unit_type: UnitKind::Giant,
                    position: Tile::new(1, 1),
                    hp: 30,
                }],
            }],
            ..ActionMenu::end_turn_only()
        }
    }

    #[test]
    fn end_turn_only_menu_is_detected() {
        assert!(ActionMenu::end_turn_only().only_end_turn());
        assert!(!sample_menu().only_end_turn());
        assert_eq!(
            ActionMenu::end_turn_only().available_kinds(),
            vec![ActionKind::EndTurn]
        );
    }

    #[test]
    fn offers_checks_entity_and_target_membership() {
        let menu = sample_menu();
        assert!(menu.offers(&Action::BuyUnit {
            city_id: CityId::new(1),
            unit_type: UnitKind::Knight
        }));
        assert!(!menu.offers(&Action::BuyUnit {
            city_id: CityId::new(1),
            unit_type: UnitKind::Dragon
        }));
        assert!(menu.offers(&Action::AttackUnit {
            unit_id: UnitId::new(2),
            x: 1,
            y: 1
        }));
        assert!(!menu.offers(&Action::AttackUnit {
            unit_id: UnitId::new(2),
            x: 2,
            y: 0
        }));
        assert!(menu.offers(&Action::end_turn()));
    }

    #[test]
    fn summary_lists_every_option_and_end_turn() {
        let summary = sample_menu().summary();
        assert!(summary.contains("buyUnit cityId=1"));
        assert!(summary.contains("giant of player 1 at (1,1)"));
        assert!(summary.ends_with("endTurn"));
    }
}
