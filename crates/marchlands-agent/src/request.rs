//! Everything an oracle is told before it proposes an action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marchlands_core::{Behavior, DiplomaticOffer, GameState, Relation, Treaty, War};
use marchlands_protocol::{ActionMenu, CityId, PlayerId, ProposedAction, Tile, UnitId, UnitKind};

/// A proposal that was refused earlier this turn, shown back to the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub action: ProposedAction,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

impl FailureRecord {
    pub fn new(action: ProposedAction, reason: impl Into<String>) -> Self {
        Self {
            action,
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnCity {
    pub id: CityId,
    pub pos: Tile,
    pub level: u32,
    pub territory_size: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnUnit {
    pub id: UnitId,
    pub unit_type: UnitKind,
    pub pos: Tile,
    pub hp: i32,
    pub max_hp: i32,
    pub has_moved: bool,
    pub has_attacked: bool,
    pub can_found_city: bool,
    pub can_conquer_city: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleCity {
    pub id: CityId,
    pub pos: Tile,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleUnit {
    pub id: UnitId,
    pub unit_type: UnitKind,
    pub pos: Tile,
    pub hp: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentSummary {
    pub id: PlayerId,
    pub name: String,
    pub score: i32,
    pub cities: Vec<VisibleCity>,
    pub units: Vec<VisibleUnit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavorEntry {
    pub player: PlayerId,
    pub favor: i32,
    pub relation: Relation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingProposal {
    pub player: PlayerId,
    pub player_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiplomacyView {
    pub favor: Vec<FavorEntry>,
    pub treaties: Vec<Treaty>,
    pub wars: Vec<War>,
    pub pending: Vec<PendingProposal>,
    pub offers: Vec<(PlayerId, Vec<DiplomaticOffer>)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub player: PlayerId,
    pub player_name: String,
    pub behavior: Behavior,
    pub coins: i32,
    pub score: i32,
    pub purchased_this_turn: bool,
    pub round: u32,
    pub grid_size: i32,
    pub cities: Vec<OwnCity>,
    pub units: Vec<OwnUnit>,
    pub opponents: Vec<OpponentSummary>,
    pub diplomacy: DiplomacyView,
    pub menu: ActionMenu,
    pub failures: Vec<FailureRecord>,
}

impl DecisionRequest {
    /// Snapshot `player`'s view of `state`. `None` if the player is not in the game.
    pub fn build(
        state: &GameState,
        player: PlayerId,
        menu: ActionMenu,
        failures: &[FailureRecord],
    ) -> Option<Self> {
        let own = state.player(player)?;

        let cities = own
            .cities
            .iter()
            .filter_map(|id| state.cities.get(*id).map(|c| (*id, c)))
            .map(|(id, c)| OwnCity {
                id,
                pos: c.pos,
                level: c.level,
                territory_size: c.territory_size(),
            })
            .collect();

        let units = own
            .units
            .iter()
            .filter_map(|id| state.units.get(*id).map(|u| (*id, u)))
            .map(|(id, u)| OwnUnit {
                id,
                unit_type: u.kind,
                pos: u.pos,
                hp: u.hp,
                max_hp: u.max_hp,
                has_moved: u.has_moved,
                has_attacked: u.has_attacked,
                can_found_city: menu.found_city.iter().any(|o| o.unit_id == id),
                can_conquer_city: menu.conquer_city.iter().any(|o| o.unit_id == id),
            })
            .collect();

        let opponents = state
            .players
            .iter()
            .filter(|p| p.id != player)
            .map(|p| OpponentSummary {
                id: p.id,
                name: p.name.clone(),
                score: state.score(p.id),
                cities: p
                    .cities
                    .iter()
                    .filter_map(|id| state.cities.get(*id).map(|c| (*id, c)))
                    .map(|(id, c)| VisibleCity {
                        id,
                        pos: c.pos,
                        level: c.level,
                    })
                    .collect(),
                units: p
                    .units
                    .iter()
                    .filter_map(|id| state.units.get(*id).map(|u| (*id, u)))
                    .map(|(id, u)| VisibleUnit {
                        id,
                        unit_type: u.kind,
                        pos: u.pos,
                        hp: u.hp,
                    })
                    .collect(),
            })
            .collect();

        let ledger = &own.diplomacy;
        let diplomacy = DiplomacyView {
            favor: ledger
                .favor_entries()
                .map(|(other, favor)| FavorEntry {
                    player: other,
                    favor,
                    relation: Relation::from_favor(favor),
                })
                .collect(),
            treaties: ledger.treaties().to_vec(),
            wars: ledger.wars().to_vec(),
            pending: ledger
                .pending()
                .iter()
                .map(|from| PendingProposal {
                    player: *from,
                    player_name: state
                        .player(*from)
                        .map(|p| p.name.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                })
                .collect(),
            offers: state.offerable_diplomacy(player),
        };

        Some(Self {
            player,
            player_name: own.name.clone(),
            behavior: own.behavior,
            coins: own.coins,
            score: state.score(player),
            purchased_this_turn: state.purchased_this_turn,
            round: state.round,
            grid_size: state.grid_size,
            cities,
            units,
            opponents,
            diplomacy,
            menu,
            failures: failures.to_vec(),
        })
    }

    /// Tiles holding any known unit or city.
    pub fn is_occupied(&self, tile: Tile) -> bool {
        self.units.iter().any(|u| u.pos == tile)
            || self.cities.iter().any(|c| c.pos == tile)
            || self
                .opponents
                .iter()
                .any(|o| o.units.iter().any(|u| u.pos == tile))
    }

    pub fn has_treaty_with(&self, other: PlayerId) -> bool {
        self.diplomacy.treaties.iter().any(|t| t.partner == other)
    }

    /// Whether `action` was already refused this turn.
    pub fn already_failed(&self, action: &ProposedAction) -> bool {
        self.failures.iter().any(|f| f.action == *action)
    }
}

#[cfg(test)]
mod tests {
    use marchlands_core::{Player, Unit};

    use super::*;

    #[test]
    fn request_describes_own_side_and_opponents() {
        let players = vec![
            Player::new(PlayerId(0), "Iron Realm (Warrior)".into(), Behavior::Warrior, 25),
            Player::new(PlayerId(1), "Golden Clan (Economist)".into(), Behavior::Economist, 10),
        ];
        let mut state = GameState::new_for_tests(20, players);
        let ids = [PlayerId(0), PlayerId(1)];
        for p in &mut state.players {
            p.diplomacy.initialize_relations(p.id, ids);
        }
        state.add_city(PlayerId(0), Tile::new(4, 4));
        state.add_city(PlayerId(1), Tile::new(15, 15));
        state.add_unit(Unit::new(UnitKind::Colonizer, PlayerId(0), Tile::new(8, 8)));
        state.add_unit(Unit::new(UnitKind::Giant, PlayerId(1), Tile::new(14, 14)));
        state.players[0].diplomacy.receive_proposal(PlayerId(1));

        let menu = state.legal_menu(PlayerId(0));
        let request = DecisionRequest::build(&state, PlayerId(0), menu, &[]).unwrap();

        assert_eq!(request.coins, 25);
        assert_eq!(request.behavior, Behavior::Warrior);
        assert_eq!(request.cities.len(), 1);
        assert!(request.units[0].can_found_city);
        assert_eq!(request.opponents.len(), 1);
        assert_eq!(request.opponents[0].units[0].unit_type, UnitKind::Giant);
        assert_eq!(request.diplomacy.pending[0].player_name, "Golden Clan (Economist)");
        assert!(request.is_occupied(Tile::new(14, 14)));
        assert!(!request.is_occupied(Tile::new(0, 0)));

        assert!(DecisionRequest::build(&state, PlayerId(5), ActionMenu::end_turn_only(), &[]).is_none());
    }
}
