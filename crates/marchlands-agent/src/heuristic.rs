//! Offline oracle: scores every menu option with the player's behavior
//! weights and proposes the best one.
//!
//! Ties keep menu order so the same request always yields the same answer.

use async_trait::async_trait;
use serde_json::json;

use marchlands_core::Relation;
use marchlands_protocol::{ActionKind, ProposedAction, Tile, UnitKind};

use crate::{Decision, DecisionRequest, Oracle, OracleError};

const CONQUER_BASE: f64 = 10.0;
const FOUND_BASE: f64 = 9.0;
const ATTACK_BASE: f64 = 6.0;
const KILL_BONUS: f64 = 3.0;
const BUY_BASE: f64 = 4.0;
const UPGRADE_BASE: f64 = 3.0;
const MOVE_BASE: f64 = 2.0;
/// Colonizers are worth more while the player holds few cities.
const EXPANSION_CITY_TARGET: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicOracle {
    /// Options scoring at or below this end the turn instead.
    pub min_score: f64,
}

impl Default for HeuristicOracle {
    fn default() -> Self {
        Self { min_score: 0.0 }
    }
}

struct Candidate {
    kind: ActionKind,
    action: ProposedAction,
    score: f64,
}

impl HeuristicOracle {
    pub fn decide(&self, request: &DecisionRequest) -> Decision {
        let mut actions = diplomacy_answers(request);

        let best = candidates(request)
            .into_iter()
            .filter(|c| !request.already_failed(&c.action))
            .map(|c| {
                let score = if c.score.is_nan() { f64::NEG_INFINITY } else { c.score };
                Candidate { score, ..c }
            })
            .fold(None::<Candidate>, |best, c| match best {
                Some(b) if b.score >= c.score => Some(b),
                _ => Some(c),
            });

        let intention = match best {
            Some(c) if c.score > self.min_score => {
                let intention = format!(
                    "As a {} nation I will {} next",
                    request.behavior,
                    describe(c.kind)
                );
                actions.push(c.action);
                intention
            }
            _ => {
                actions.push(ProposedAction::end_turn());
                "Nothing worthwhile left this turn".to_string()
            }
        };

        Decision::new(intention, actions)
    }
}

#[async_trait]
impl Oracle for HeuristicOracle {
    async fn propose(&self, request: &DecisionRequest) -> Result<Decision, OracleError> {
        Ok(self.decide(request))
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

fn describe(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::UpgradeCity => "grow a city",
        ActionKind::BuyUnit => "raise a unit",
        ActionKind::MoveUnit => "reposition a unit",
        ActionKind::AttackUnit => "strike an enemy",
        ActionKind::FoundCity => "found a city",
        ActionKind::ConquerCity => "take an enemy city",
        _ => "wait",
    }
}

/// Accept pending treaties from anyone we are not hostile toward; refuse the rest.
fn diplomacy_answers(request: &DecisionRequest) -> Vec<ProposedAction> {
    request
        .diplomacy
        .pending
        .iter()
        .map(|pending| {
            let hostile = request
                .diplomacy
                .favor
                .iter()
                .any(|f| f.player == pending.player && f.relation == Relation::Hostile);
            let kind = if hostile {
                ActionKind::RejectPeaceTreaty
            } else {
                ActionKind::AcceptPeaceTreaty
            };
            ProposedAction::new(kind.name(), json!({ "playerId": pending.player }))
        })
        .collect()
}

fn candidates(request: &DecisionRequest) -> Vec<Candidate> {
    let weights = request.behavior.action_weights();
    let preferences = request.behavior.unit_preferences();
    let menu = &request.menu;
    let mut out = Vec::new();

    for option in &menu.conquer_city {
        out.push(Candidate {
            kind: ActionKind::ConquerCity,
            action: ProposedAction::new("conquerCity", json!({ "unitId": option.unit_id })),
            score: CONQUER_BASE * weights.conquer_city,
        });
    }

    for option in &menu.found_city {
        out.push(Candidate {
            kind: ActionKind::FoundCity,
            action: ProposedAction::new("foundCity", json!({ "unitId": option.unit_id })),
            score: FOUND_BASE * weights.found_city,
        });
    }

    for option in &menu.attack_unit {
        let attack = option.unit_type.stats().attack;
        for target in &option.targets {
            let bonus = if attack >= target.hp { KILL_BONUS } else { 0.0 };
            out.push(Candidate {
                kind: ActionKind::AttackUnit,
                action: ProposedAction::new(
                    "attackUnit",
                    json!({ "unitId": option.unit_id, "x": target.position.x, "y": target.position.y }),
                ),
                score: (ATTACK_BASE + bonus) * weights.attack_unit,
            });
        }
    }

    for option in &menu.buy_unit {
        let pick = option
            .affordable
            .iter()
            .map(|kind| {
                let mut preference = preferences.get(*kind);
                if *kind == UnitKind::Colonizer && request.cities.len() < EXPANSION_CITY_TARGET {
                    preference *= 1.5;
                }
                (*kind, preference)
            })
            .fold(None::<(UnitKind, f64)>, |best, c| match best {
                Some(b) if b.1 >= c.1 => Some(b),
                _ => Some(c),
            });
        if let Some((kind, preference)) = pick {
            out.push(Candidate {
                kind: ActionKind::BuyUnit,
                action: ProposedAction::new(
                    "buyUnit",
                    json!({ "cityId": option.city_id, "unitType": kind.name() }),
                ),
                score: BUY_BASE * weights.buy_unit * preference,
            });
        }
    }

    for option in &menu.upgrade_city {
        out.push(Candidate {
            kind: ActionKind::UpgradeCity,
            action: ProposedAction::new("upgradeCity", json!({ "cityId": option.city_id })),
            score: UPGRADE_BASE * weights.upgrade_city / option.level as f64,
        });
    }

    for option in &menu.move_unit {
        let can_found = request
            .units
            .iter()
            .any(|u| u.id == option.unit_id && u.can_found_city);
        if can_found {
            continue;
        }
        let goal = if option.unit_type == UnitKind::Colonizer {
            settling_goal(request, option.position)
        } else {
            hostile_goal(request, option.position)
        };
        let Some(goal) = goal else {
            continue;
        };
        let destination = step_toward(option.position, goal, option.movement, request.grid_size);
        if destination == option.position || request.is_occupied(destination) {
            continue;
        }
        out.push(Candidate {
            kind: ActionKind::MoveUnit,
            action: ProposedAction::new(
                "moveUnit",
                json!({ "unitId": option.unit_id, "x": destination.x, "y": destination.y }),
            ),
            score: MOVE_BASE * weights.move_unit,
        });
    }

    out
}

fn every_city(request: &DecisionRequest) -> impl Iterator<Item = Tile> + '_ {
    request
        .cities
        .iter()
        .map(|c| c.pos)
        .chain(request.opponents.iter().flat_map(|o| o.cities.iter().map(|c| c.pos)))
}

/// A colonizer walks directly away from the nearest city.
fn settling_goal(request: &DecisionRequest, from: Tile) -> Option<Tile> {
    let nearest = every_city(request).min_by_key(|c| c.chebyshev(from))?;
    let dx = (from.x - nearest.x).signum();
    let dy = (from.y - nearest.y).signum();
    let (dx, dy) = if dx == 0 && dy == 0 { (1, 1) } else { (dx, dy) };
    Some(Tile::new(from.x + dx * request.grid_size, from.y + dy * request.grid_size))
}

/// Nearest city of a player we may fight, else nearest such unit.
fn hostile_goal(request: &DecisionRequest, from: Tile) -> Option<Tile> {
    let hostile = request
        .opponents
        .iter()
        .filter(|o| !request.has_treaty_with(o.id));
    let cities: Vec<Tile> = hostile
        .clone()
        .flat_map(|o| o.cities.iter().map(|c| c.pos))
        .collect();
    if let Some(city) = cities.into_iter().min_by_key(|c| c.chebyshev(from)) {
        return Some(city);
    }
    hostile
        .flat_map(|o| o.units.iter().map(|u| u.pos))
        .min_by_key(|u| u.chebyshev(from))
}

/// Up to `movement` tiles along each axis toward `goal`, kept on the grid.
fn step_toward(from: Tile, goal: Tile, movement: i32, grid_size: i32) -> Tile {
    let dx = (goal.x - from.x).clamp(-movement, movement);
    let dy = (goal.y - from.y).clamp(-movement, movement);
    let max = (grid_size - 1).max(0);
    Tile::new((from.x + dx).clamp(0, max), (from.y + dy).clamp(0, max))
}
