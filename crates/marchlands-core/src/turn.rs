//! Turn controller: rotation, round hooks and elimination.

use marchlands_protocol::{Event, PlayerId};

use crate::{GameError, GameState};

/// Favor lost toward a player whose unit stands inside our territory.
pub const TERRITORY_VIOLATION_FAVOR: i32 = -10;
/// Favor lost toward a player whose unit stands next to our territory.
pub const BORDER_VIOLATION_FAVOR: i32 = -5;
/// Favor gained toward a player that kept away from our borders.
pub const BORDER_RESPECT_FAVOR: i32 = 1;

impl GameState {
    /// Finish the current player's turn and activate the next one.
    pub(crate) fn advance_turn(&mut self, events: &mut Vec<Event>) -> Result<(), GameError> {
        if self.is_game_over() || self.players.len() <= 1 {
            return Err(GameError::GameOver);
        }

        let round = self.round;
        if let Some(outgoing) = self.players.get_mut(self.current) {
            outgoing.is_active = false;
            outgoing.diplomacy.process_turn();
            events.push(Event::TurnEnded {
                round,
                player: outgoing.id,
            });
        }

        self.current = (self.current + 1) % self.players.len();

        if self.current == 0 {
            self.round += 1;
            events.push(Event::RoundStarted { round: self.round });
            tracing::debug!(round = self.round, "round started");
            self.scan_borders(events);
            self.collect_income(events);
        }

        self.purchased_this_turn = false;
        let Some(incoming) = self.players.get_mut(self.current) else {
            return Err(GameError::Invariant(format!(
                "turn index {} outside {} players",
                self.current,
                self.players.len()
            )));
        };
        incoming.is_active = true;
        let incoming_id = incoming.id;
        let roster = incoming.units.clone();
        for unit_id in roster {
            if let Some(unit) = self.units.get_mut(unit_id) {
                unit.reset_turn();
            }
        }

        events.push(Event::TurnStarted {
            round: self.round,
            player: incoming_id,
        });
        Ok(())
    }

    /// Once per round: every player reviews every non-enemy's unit positions.
    fn scan_borders(&mut self, events: &mut Vec<Event>) {
        let territory = self.territory();

        let mut changes: Vec<(usize, PlayerId, i32)> = Vec::new();
        for (index, watcher) in self.players.iter().enumerate() {
            for visitor in &self.players {
                if visitor.id == watcher.id || watcher.diplomacy.is_at_war(visitor.id) {
                    continue;
                }

                let mut inside = false;
                let mut adjacent = false;
                for pos in visitor
                    .units
                    .iter()
                    .filter_map(|id| self.units.get(*id))
                    .map(|u| u.pos)
                {
                    if territory.owner_at(pos) == Some(watcher.id) {
                        inside = true;
                    } else if territory.borders(pos, watcher.id) {
                        adjacent = true;
                    }
                }

                let delta = if inside {
                    TERRITORY_VIOLATION_FAVOR
                } else if adjacent {
                    BORDER_VIOLATION_FAVOR
                } else {
                    BORDER_RESPECT_FAVOR
                };
                changes.push((index, visitor.id, delta));
            }
        }

        for (index, visitor, delta) in changes {
            let watcher = &mut self.players[index];
            let favor = watcher.diplomacy.change_favor(visitor, delta);
            if delta < 0 {
                events.push(Event::FavorChanged {
                    player: watcher.id,
                    toward: visitor,
                    delta,
                    favor,
                });
            }
        }
    }

    /// Base income (sum of city levels) plus treaty bonuses for everyone.
    fn collect_income(&mut self, events: &mut Vec<Event>) {
        let incomes: Vec<(PlayerId, i32)> = self
            .players
            .iter()
            .map(|p| (p.id, self.base_income(p.id) + p.diplomacy.treaty_income()))
            .collect();

        for (id, amount) in incomes {
            if let Some(player) = self.player_mut(id) {
                player.coins += amount;
                events.push(Event::IncomeCollected {
                    player: id,
                    amount,
                    balance: player.coins,
                });
            }
        }
    }

    /// Remove a player who lost their last city.
    pub(crate) fn eliminate(&mut self, player: PlayerId, by: Option<PlayerId>, events: &mut Vec<Event>) {
        let Some(index) = self.player_index(player) else {
            return;
        };

        let roster = self.players[index].units.clone();
        for unit_id in roster {
            self.remove_unit(unit_id);
        }

        if index < self.current {
            self.current -= 1;
        }
        let mut removed = self.players.remove(index);
        removed.is_active = false;
        if self.current >= self.players.len() {
            self.current = 0;
        }

        for survivor in &mut self.players {
            survivor.diplomacy.forget(player);
        }

        tracing::info!(player = %player, name = %removed.name, "player eliminated");
        self.eliminated.push(removed);
        events.push(Event::PlayerEliminated { player, by });

        if let [last] = self.players.as_slice() {
            self.winner = Some(last.id);
            tracing::info!(winner = %last.id, name = %last.name, "game over");
            events.push(Event::GameEnded { winner: last.id });
        }
    }
}

#[cfg(test)]
mod tests {
    use marchlands_protocol::{Tile, UnitKind};

    use super::*;
    use crate::{Behavior, Player, Unit};

    fn state_with(count: u8) -> GameState {
        let players = (0..count)
            .map(|i| Player::new(PlayerId(i), format!("p{i}"), Behavior::Balanced, 10))
            .collect();
        let mut state = GameState::new_for_tests(50, players);
        let ids: Vec<PlayerId> = state.players.iter().map(|p| p.id).collect();
        for p in &mut state.players {
            p.diplomacy.initialize_relations(p.id, ids.iter().copied());
        }
        state
    }

    #[test]
    fn rotation_wraps_into_a_new_round_with_income() {
        let mut state = state_with(2);
        state.add_city(PlayerId(0), Tile::new(5, 5));
        state.add_city(PlayerId(1), Tile::new(30, 30));

        let mut events = Vec::new();
        state.advance_turn(&mut events).unwrap();
        assert_eq!(state.current_player_id(), Some(PlayerId(1)));
        assert_eq!(state.round, 1);
        assert!(state.players[1].is_active && !state.players[0].is_active);

        state.advance_turn(&mut events).unwrap();
        assert_eq!(state.current_player_id(), Some(PlayerId(0)));
        assert_eq!(state.round, 2);
        assert_eq!(state.players[0].coins, 11);
        assert_eq!(state.players[1].coins, 11);
        assert!(events.contains(&Event::RoundStarted { round: 2 }));
    }

    #[test]
    fn incoming_player_gets_fresh_units_and_purchase_gate() {
        let mut state = state_with(2);
        let unit = state.add_unit(Unit::new(UnitKind::Soldier, PlayerId(1), Tile::new(1, 1)));
        if let Some(u) = state.units.get_mut(unit) {
            u.has_moved = true;
            u.has_attacked = true;
        }
        state.purchased_this_turn = true;

        state.advance_turn(&mut Vec::new()).unwrap();
        assert!(!state.purchased_this_turn);
        assert!(state.units.get(unit).is_some_and(|u| u.is_fresh()));
    }

    #[test]
    fn border_scan_penalizes_intruders_and_rewards_distance() {
        let mut state = state_with(3);
        state.add_city(PlayerId(0), Tile::new(10, 10));
        state.add_unit(Unit::new(UnitKind::Soldier, PlayerId(1), Tile::new(11, 11)));
        state.add_unit(Unit::new(UnitKind::Soldier, PlayerId(2), Tile::new(12, 10)));

        let mut events = Vec::new();
        state.scan_borders(&mut events);
        let watcher = &state.players[0].diplomacy;
        assert_eq!(watcher.favor(PlayerId(1)), -10);
        assert_eq!(watcher.favor(PlayerId(2)), -5);
        assert_eq!(state.players[1].diplomacy.favor(PlayerId(2)), 1);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn players_at_war_skip_the_border_scan() {
        let mut state = state_with(2);
        state.add_city(PlayerId(0), Tile::new(10, 10));
        state.add_unit(Unit::new(UnitKind::Soldier, PlayerId(1), Tile::new(11, 11)));
        state.players[0].diplomacy.declare_war(PlayerId(1));

        state.scan_borders(&mut Vec::new());
        assert_eq!(state.players[0].diplomacy.favor(PlayerId(1)), -100);
    }

    #[test]
    fn elimination_before_current_shifts_the_index() {
        let mut state = state_with(3);
        let doomed = state.add_unit(Unit::new(UnitKind::Knight, PlayerId(0), Tile::new(2, 2)));
        state.current = 2;
        state.players[2].diplomacy.sign_treaty(PlayerId(0));

        let mut events = Vec::new();
        state.eliminate(PlayerId(0), Some(PlayerId(2)), &mut events);

        assert_eq!(state.current_player_id(), Some(PlayerId(2)));
        assert!(state.units.get(doomed).is_none());
        assert!(state.players[1].diplomacy.treaties().is_empty());
        assert!(state.winner.is_none());

        state.eliminate(PlayerId(1), Some(PlayerId(2)), &mut events);
        assert_eq!(state.winner, Some(PlayerId(2)));
        assert!(events.contains(&Event::GameEnded { winner: PlayerId(2) }));
        assert_eq!(state.advance_turn(&mut events), Err(GameError::GameOver));
    }
}
