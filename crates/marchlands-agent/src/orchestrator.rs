//! Decision loop for one autonomous turn.
//!
//! Each iteration takes the next queued action or asks the oracle for a new
//! plan, then re-validates that action against a freshly computed menu
//! before applying it. Refusals are recorded and shown to the oracle on the
//! next request; they never end the turn by themselves.

use std::collections::VecDeque;

use marchlands_core::{GameEngine, GameError};
use marchlands_protocol::{Action, Event, PlayerId, ProposedAction};

use crate::{
    AgentConfig, Decision, DecisionRequest, FailureRecord, MessageLog, Oracle, OracleError,
};

/// Said when endTurn is the only legal action; the oracle is not consulted.
pub const NOTHING_TO_DO: &str = "Nothing else I can do this turn.";

/// Why the loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEnd {
    /// The plan reached an endTurn.
    EndTurn,
    /// Only endTurn was legal.
    NothingToDo,
    /// Unreachable, malformed or timed out; the turn falls back to endTurn.
    OracleFailed(OracleError),
    IterationCap,
    GameOver,
}

#[derive(Debug, Clone)]
pub struct TurnReport {
    pub player: PlayerId,
    pub end: TurnEnd,
    pub iterations: usize,
    pub oracle_calls: usize,
    pub applied: usize,
    pub intention: Option<String>,
    pub failures: Vec<FailureRecord>,
    pub events: Vec<Event>,
}

/// Per-turn loop state. Only one turn is in flight at a time, and `play_turn`
/// borrows the engine mutably for its whole duration.
pub struct Orchestrator {
    config: AgentConfig,
    queue: VecDeque<ProposedAction>,
    failures: Vec<FailureRecord>,
    intention: Option<String>,
}

impl Orchestrator {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config,
            queue: VecDeque::new(),
            failures: Vec::new(),
            intention: None,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn has_pending_actions(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Drop the queued plan, refusals and intention.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.failures.clear();
        self.intention = None;
    }

    /// Run the current player's turn until it should end. Does not apply the
    /// final endTurn; the caller advances the turn controller.
    ///
    /// Only `GameError::Invariant` escapes: every other problem is recorded
    /// and recovered here.
    pub async fn play_turn(
        &mut self,
        engine: &mut GameEngine,
        oracle: &dyn Oracle,
        log: &mut MessageLog,
    ) -> Result<TurnReport, GameError> {
        self.clear();
        let player = engine.current_player().ok_or(GameError::GameOver)?;
        let name = engine
            .state()
            .player(player)
            .map(|p| p.name.clone())
            .unwrap_or_default();

        let mut report = TurnReport {
            player,
            end: TurnEnd::EndTurn,
            iterations: 0,
            oracle_calls: 0,
            applied: 0,
            intention: None,
            failures: Vec::new(),
            events: Vec::new(),
        };

        tracing::debug!(player = %player, round = engine.state().round, "autonomous turn");

        let end = loop {
            if engine.is_game_over() {
                break TurnEnd::GameOver;
            }
            if report.iterations >= self.config.max_iterations_per_turn {
                tracing::warn!(player = %player, iterations = report.iterations, "iteration cap reached");
                break TurnEnd::IterationCap;
            }
            report.iterations += 1;

            let proposed = match self.queue.pop_front() {
                Some(next) => next,
                None => {
                    let menu = engine.legal_menu(player);
                    if menu.only_end_turn() {
                        log.push(player, &name, NOTHING_TO_DO);
                        break TurnEnd::NothingToDo;
                    }
                    let Some(request) =
                        DecisionRequest::build(engine.state(), player, menu, &self.failures)
                    else {
                        break TurnEnd::GameOver;
                    };

                    report.oracle_calls += 1;
                    let decision = match self.ask(oracle, &request).await {
                        Ok(decision) => decision,
                        Err(err) => {
                            tracing::warn!(player = %player, oracle = oracle.name(), error = %err, "oracle failed, ending turn");
                            log.push(player, &name, format!("I could not decide ({err}); ending my turn."));
                            break TurnEnd::OracleFailed(err);
                        }
                    };

                    if self.intention.is_none() {
                        log.push(player, &name, decision.intention.clone());
                        self.intention = Some(decision.intention);
                    }

                    let moves =
                        self.apply_side_actions(engine, player, &name, decision.actions, log, &mut report)?;
                    self.queue.extend(moves);
                    match self.queue.pop_front() {
                        Some(first) => first,
                        None => break TurnEnd::EndTurn,
                    }
                }
            };

            let action = match proposed.parse() {
                Ok(action) => action,
                Err(err) => {
                    self.refuse(proposed, err.to_string(), player);
                    continue;
                }
            };
            if action.is_end_turn() {
                break TurnEnd::EndTurn;
            }

            match engine.apply(player, &action) {
                Ok(events) => {
                    report.applied += 1;
                    report.events.extend(events);
                    if !self.config.pacing().is_zero() {
                        tokio::time::sleep(self.config.pacing()).await;
                    }
                }
                Err(GameError::Rejected(reason)) => {
                    log.push(player, &name, format!("Tried to {} but {reason}.", action.kind()));
                    self.refuse(proposed, reason.to_string(), player);
                }
                Err(GameError::GameOver) => break TurnEnd::GameOver,
                Err(err) => return Err(err),
            }
        };

        report.end = end;
        report.intention = self.intention.take();
        report.failures = std::mem::take(&mut self.failures);
        self.clear();
        tracing::debug!(
            player = %player,
            end = ?report.end,
            applied = report.applied,
            refused = report.failures.len(),
            "turn finished"
        );
        Ok(report)
    }

    async fn ask(&self, oracle: &dyn Oracle, request: &DecisionRequest) -> Result<Decision, OracleError> {
        let timeout = self.config.oracle_timeout();
        match tokio::time::timeout(timeout, oracle.propose(request)).await {
            Ok(result) => result,
            Err(_) => Err(OracleError::Timeout(timeout)),
        }
    }

    /// Treaty answers take effect at once; everything else is returned as
    /// the move queue, in order.
    fn apply_side_actions(
        &mut self,
        engine: &mut GameEngine,
        player: PlayerId,
        name: &str,
        actions: Vec<ProposedAction>,
        log: &mut MessageLog,
        report: &mut TurnReport,
    ) -> Result<Vec<ProposedAction>, GameError> {
        let mut moves = Vec::with_capacity(actions.len());
        for proposed in actions {
            if !proposed.kind().is_some_and(|k| k.is_diplomacy()) {
                moves.push(proposed);
                continue;
            }
            let action = match proposed.parse() {
                Ok(action) => action,
                Err(err) => {
                    self.refuse(proposed, err.to_string(), player);
                    continue;
                }
            };
            let other = match action {
                Action::AcceptPeaceTreaty { player_id } | Action::RejectPeaceTreaty { player_id } => {
                    player_id
                }
                _ => continue,
            };
            let other_name = engine
                .state()
                .player(other)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| format!("player {other}"));

            match engine.apply(player, &action) {
                Ok(events) => {
                    let message = if matches!(action, Action::AcceptPeaceTreaty { .. }) {
                        format!("I accept the peace treaty from {other_name}. May we both prosper.")
                    } else {
                        format!("I reject the peace treaty from {other_name}. This is no time for peace.")
                    };
                    log.push(player, name, message);
                    report.events.extend(events);
                }
                Err(GameError::Rejected(reason)) => self.refuse(proposed, reason.to_string(), player),
                Err(GameError::GameOver) => break,
                Err(err) => return Err(err),
            }
        }
        Ok(moves)
    }

    fn refuse(&mut self, action: ProposedAction, reason: String, player: PlayerId) {
        tracing::debug!(player = %player, action = %action.action, reason = %reason, "proposal refused");
        self.failures.push(FailureRecord::new(action, reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_drops_the_plan() {
        let mut orchestrator = Orchestrator::new(AgentConfig::default());
        orchestrator.queue.push_back(ProposedAction::end_turn());
        orchestrator.intention = Some("hold".into());
        assert!(orchestrator.has_pending_actions());
        orchestrator.clear();
        assert!(!orchestrator.has_pending_actions());
        assert!(orchestrator.intention.is_none());
    }
}
