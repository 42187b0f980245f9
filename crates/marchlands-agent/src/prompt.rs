//! Natural-language rendering of a [`DecisionRequest`] for language-model oracles.

use std::fmt::Write;

use marchlands_protocol::UnitKind;

use crate::DecisionRequest;

const RULES: &str = "\
Game rules:
- Players take turns managing cities and units on a square grid.
- Each round every city pays its level in coins; every peace treaty pays 2 more.
- Upgrading a city costs 50 coins times its current level.
- A city claims territory around it. The radius is 1, and grows only at levels 4, 7 and 10.
- A player may buy at most one unit per turn, on a city tile with no unit on it.
- A unit may move once and attack once per turn. Attacks reach adjacent tiles, diagonals included.
- Only colonizers found cities, only if they have not moved this turn, and never within 2 tiles of another city.
- A unit that starts its turn on an enemy city may conquer it. Losing the last city eliminates a player.

Diplomacy:
- Favor rises when others keep away from your borders and falls when they enter or approach them.
- Treaty partners cannot attack each other or take each other's cities.
- Breaking a treaty drops favor with the partner to -100 and costs 15 favor with everyone else.
- A war must last 10 turns before peace can be proposed.

Tips:
- Several cities usually beat one large city; territory only grows at levels 4, 7 and 10.
- Spread cities out to claim more land and earn more income.";

fn unit_catalog() -> String {
    let mut out = String::from("Units:\n");
    for kind in UnitKind::ALL {
        let stats = kind.stats();
        let _ = writeln!(
            out,
            "- {kind}: costs {} coins, {} HP, {} attack, moves {}",
            stats.cost, stats.hp, stats.attack, stats.movement
        );
    }
    out
}

const RESPONSE_FORMAT: &str = r#"Respond with one JSON object and nothing else:
{
  "intention": "one sentence on your strategy this turn",
  "actions": [
    {"action": "moveUnit", "parameters": {"unitId": 2, "x": 5, "y": 7}}
  ]
}

Valid actions and parameters:
- upgradeCity {"cityId"}
- buyUnit {"cityId", "unitType": one of soldier, knight, giant, dragon, colonizer}
- moveUnit {"unitId", "x", "y"}
- attackUnit {"unitId", "x", "y"} where x, y is the target's tile
- foundCity {"unitId"} (colonizers only)
- conquerCity {"unitId"}
- acceptPeaceTreaty {"playerId"} / rejectPeaceTreaty {"playerId"} for pending proposals
- endTurn {}

You may list several actions; they are tried in order. Use only ids shown above and only actions listed as available."#;

pub fn render_prompt(request: &DecisionRequest) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "You are playing a turn-based strategy game as \"{}\" with {} coins.\n",
        request.player_name, request.coins
    );
    let _ = writeln!(out, "{RULES}\n");
    let _ = writeln!(out, "{}", unit_catalog());

    let _ = writeln!(out, "YOUR NATION: {}", request.behavior);
    let _ = writeln!(out, "{}", request.behavior.description());
    let _ = writeln!(
        out,
        "Choose actions that fit a {} nation.\n",
        request.behavior
    );

    let _ = writeln!(out, "STATE:");
    let _ = writeln!(out, "- Round: {}", request.round);
    let _ = writeln!(out, "- Map: {0}x{0}", request.grid_size);
    let _ = writeln!(out, "- Score: {}", request.score);
    let _ = writeln!(out, "- Your cities:");
    for city in &request.cities {
        let _ = writeln!(
            out,
            "  * city {} at {} level {} territory {}",
            city.id, city.pos, city.level, city.territory_size
        );
    }
    let _ = writeln!(out, "- Your units:");
    for unit in &request.units {
        let _ = writeln!(
            out,
            "  * unit {} {} at {} hp {}/{} can move: {} can attack: {}",
            unit.id,
            unit.unit_type,
            unit.pos,
            unit.hp,
            unit.max_hp,
            !unit.has_moved,
            !unit.has_attacked
        );
    }
    let _ = writeln!(out, "- Other players:");
    for other in &request.opponents {
        let cities: Vec<String> = other
            .cities
            .iter()
            .map(|c| format!("{} L{}", c.pos, c.level))
            .collect();
        let units: Vec<String> = other
            .units
            .iter()
            .map(|u| format!("{} {} hp {}", u.unit_type, u.pos, u.hp))
            .collect();
        let _ = writeln!(
            out,
            "  * player {} \"{}\" score {} cities [{}] units [{}]",
            other.id,
            other.name,
            other.score,
            cities.join(", "),
            units.join(", ")
        );
    }
    let _ = writeln!(
        out,
        "- You {} bought a unit this turn",
        if request.purchased_this_turn { "have" } else { "have not" }
    );

    let _ = writeln!(out, "\nDIPLOMACY:");
    for entry in &request.diplomacy.favor {
        let _ = writeln!(
            out,
            "- player {}: favor {} ({:?})",
            entry.player, entry.favor, entry.relation
        );
    }
    for treaty in &request.diplomacy.treaties {
        let _ = writeln!(
            out,
            "- treaty with player {} for {} turns",
            treaty.partner, treaty.turns_active
        );
    }
    for war in &request.diplomacy.wars {
        let _ = writeln!(
            out,
            "- at war with player {}, peace possible in {} turns",
            war.enemy, war.turns_remaining
        );
    }
    for pending in &request.diplomacy.pending {
        let _ = writeln!(
            out,
            "- pending peace treaty from player {} \"{}\"",
            pending.player, pending.player_name
        );
    }

    if !request.failures.is_empty() {
        let _ = writeln!(out, "\nREFUSED EARLIER THIS TURN (do not repeat):");
        for failure in &request.failures {
            let _ = writeln!(out, "- {}: {}", failure.action.action, failure.reason);
        }
    }

    let _ = writeln!(out, "\nAVAILABLE ACTIONS:");
    if request.menu.only_end_turn() {
        let _ = writeln!(out, "Only endTurn is available. End your turn.");
    } else {
        let _ = writeln!(out, "{}", request.menu.summary());
    }

    let _ = write!(out, "\n{RESPONSE_FORMAT}");
    out
}

#[cfg(test)]
mod tests {
    use marchlands_core::{Behavior, GameState, Player};
    use marchlands_protocol::{PlayerId, ProposedAction, Tile};
    use serde_json::json;

    use super::*;
    use crate::FailureRecord;

    #[test]
    fn prompt_carries_behavior_menu_and_failures() {
        let players = vec![
            Player::new(PlayerId(0), "Great Empire (Defender)".into(), Behavior::Defender, 60),
            Player::new(PlayerId(1), "Iron Clan (Warrior)".into(), Behavior::Warrior, 10),
        ];
        let mut state = GameState::new_for_tests(30, players);
        state.add_city(PlayerId(0), Tile::new(3, 3));
        let failures = vec![FailureRecord::new(
            ProposedAction::new("foundCity", json!({"unitId": 9})),
            "unit 9 does not exist",
        )];
        let menu = state.legal_menu(PlayerId(0));
        let request = DecisionRequest::build(&state, PlayerId(0), menu, &failures).unwrap();

        let prompt = render_prompt(&request);
        assert!(prompt.contains("Great Empire (Defender)"));
        assert!(prompt.contains("YOUR NATION: Defender"));
        assert!(prompt.contains("upgradeCity cityId=1"));
        assert!(prompt.contains("foundCity: unit 9 does not exist"));
        assert!(prompt.contains("dragon: costs 30 coins"));
    }
}
