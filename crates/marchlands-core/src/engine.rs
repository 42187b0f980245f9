use std::collections::HashSet;

use marchlands_protocol::{Action, ActionMenu, Event, GameSnapshot, PlayerId};

use crate::{GameConfig, GameError, GameState, RejectReason};

/// Single entry point for every state change, human or autonomous.
///
/// Validation and mutation happen in one step: a rejected action leaves the
/// state untouched.
#[derive(Clone, Debug)]
pub struct GameEngine {
    state: GameState,
}

impl GameEngine {
    pub fn new_game(config: &GameConfig) -> Result<Self, GameError> {
        Ok(Self {
            state: GameState::new_game(config)?,
        })
    }

    pub fn from_state(state: GameState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn current_player(&self) -> Option<PlayerId> {
        self.state.current_player_id()
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    pub fn legal_menu(&self, player: PlayerId) -> ActionMenu {
        self.state.legal_menu(player)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.state.snapshot()
    }

    /// Only the current player of a running game may act.
    fn check_turn(&self, player: PlayerId) -> Result<(), GameError> {
        if self.state.is_game_over() {
            return Err(GameError::GameOver);
        }
        if self.state.current_player_id() != Some(player) {
            return Err(RejectReason::NotYourTurn(player).into());
        }
        Ok(())
    }

    /// Apply one action for `player`, who must be the current player.
    pub fn apply(&mut self, player: PlayerId, action: &Action) -> Result<Vec<Event>, GameError> {
        self.check_turn(player)?;

        let mut events = Vec::new();
        let result = match action {
            Action::EndTurn {} => self.state.advance_turn(&mut events),
            Action::AcceptPeaceTreaty { player_id } => self
                .state
                .accept_treaty(*player_id, player, &mut events)
                .map_err(GameError::from),
            Action::RejectPeaceTreaty { player_id } => self
                .state
                .reject_treaty(*player_id, player, &mut events)
                .map_err(GameError::from),
            _ => self.state.apply_move(player, action, &mut events),
        };

        if let Err(err) = result {
            tracing::debug!(player = %player, action = %action.kind(), error = %err, "action rejected");
            return Err(err);
        }

        tracing::debug!(player = %player, action = %action.kind(), events = events.len(), "action applied");
        self.verify()?;
        Ok(events)
    }

    /// End the current player's turn.
    pub fn end_turn(&mut self) -> Result<Vec<Event>, GameError> {
        let player = self.current_player().ok_or(GameError::GameOver)?;
        self.apply(player, &Action::end_turn())
    }

    // Diplomacy commands are taken on the acting player's own turn, like
    // every action routed through `apply`.

    pub fn propose_treaty(&mut self, from: PlayerId, to: PlayerId) -> Result<Vec<Event>, GameError> {
        self.check_turn(from)?;
        let mut events = Vec::new();
        self.state.propose_treaty(from, to, &mut events)?;
        Ok(events)
    }

    pub fn accept_treaty(&mut self, proposer: PlayerId, acceptor: PlayerId) -> Result<Vec<Event>, GameError> {
        self.check_turn(acceptor)?;
        let mut events = Vec::new();
        self.state.accept_treaty(proposer, acceptor, &mut events)?;
        self.verify()?;
        Ok(events)
    }

    pub fn reject_treaty(&mut self, proposer: PlayerId, rejector: PlayerId) -> Result<Vec<Event>, GameError> {
        self.check_turn(rejector)?;
        let mut events = Vec::new();
        self.state.reject_treaty(proposer, rejector, &mut events)?;
        Ok(events)
    }

    pub fn break_treaty(&mut self, by: PlayerId, other: PlayerId) -> Result<Vec<Event>, GameError> {
        self.check_turn(by)?;
        let mut events = Vec::new();
        self.state.break_treaty(by, other, &mut events)?;
        self.verify()?;
        Ok(events)
    }

    pub fn declare_war(&mut self, aggressor: PlayerId, target: PlayerId) -> Result<Vec<Event>, GameError> {
        self.check_turn(aggressor)?;
        let mut events = Vec::new();
        self.state.declare_war(aggressor, target, &mut events)?;
        self.verify()?;
        Ok(events)
    }

    pub fn propose_peace(&mut self, from: PlayerId, to: PlayerId) -> Result<Vec<Event>, GameError> {
        self.check_turn(from)?;
        let mut events = Vec::new();
        self.state.propose_peace(from, to, &mut events)?;
        Ok(events)
    }

    fn verify(&self) -> Result<(), GameError> {
        if cfg!(debug_assertions) {
            self.check_invariants()?;
        }
        Ok(())
    }

    /// Structural invariants that only a bug can break.
    pub fn check_invariants(&self) -> Result<(), GameError> {
        let state = &self.state;

        let mut city_tiles = HashSet::new();
        for (id, city) in state.cities.iter_ordered() {
            if !city_tiles.insert(city.pos) {
                return Err(GameError::Invariant(format!("two cities on {}", city.pos)));
            }
            if city.level < 1 {
                return Err(GameError::Invariant(format!("city {id} below level 1")));
            }
            if let Some(owner) = state.player(city.owner) {
                if !owner.cities.contains(&id) {
                    return Err(GameError::Invariant(format!(
                        "city {id} missing from roster of player {}",
                        owner.id
                    )));
                }
            }
        }

        let mut unit_tiles = HashSet::new();
        for (id, unit) in state.units.iter_ordered() {
            if unit.hp <= 0 || unit.hp > unit.max_hp {
                return Err(GameError::Invariant(format!(
                    "unit {id} has hp {}/{}",
                    unit.hp, unit.max_hp
                )));
            }
            if !unit_tiles.insert(unit.pos) {
                return Err(GameError::Invariant(format!("two units on {}", unit.pos)));
            }
            let rostered = state
                .player(unit.owner)
                .is_some_and(|p| p.units.contains(&id));
            if !rostered {
                return Err(GameError::Invariant(format!(
                    "unit {id} not on the roster of player {}",
                    unit.owner
                )));
            }
        }

        for player in &state.players {
            for unit in &player.units {
                if !state.units.contains(*unit) {
                    return Err(GameError::Invariant(format!(
                        "player {} lists dead unit {unit}",
                        player.id
                    )));
                }
            }
            for (other, favor) in player.diplomacy.favor_entries() {
                if !(-100..=100).contains(&favor) {
                    return Err(GameError::Invariant(format!(
                        "favor {favor} of player {} toward {other} out of range",
                        player.id
                    )));
                }
                if player.diplomacy.has_treaty(other) && player.diplomacy.is_at_war(other) {
                    return Err(GameError::Invariant(format!(
                        "players {} and {other} hold both a treaty and a war",
                        player.id
                    )));
                }
            }
        }

        Ok(())
    }
}
