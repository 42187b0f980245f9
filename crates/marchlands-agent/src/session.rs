use anyhow::Result;

use marchlands_core::{
    DiplomaticOffer, GameEngine, GameError, HumanInput, InputController, InputOutcome, RejectReason,
};
use marchlands_protocol::{Event, GameSnapshot, PlayerId, ScoreEntry};

use crate::{build_oracle, AgentConfig, EventSink, MarchlandsConfig, MessageLog, Oracle, Orchestrator};

/// Why [`Session::run`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    GameOver { winner: PlayerId },
    RoundLimit,
    /// A human seat is up; drive it with `submit_input` / `end_human_turn`.
    AwaitingHuman(PlayerId),
}

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub stop: StopReason,
    pub round: u32,
    pub turns_played: usize,
    pub rankings: Vec<ScoreEntry>,
}

/// One game: engine, oracle, decision loop and the player-facing log.
pub struct Session {
    engine: GameEngine,
    oracle: Box<dyn Oracle>,
    orchestrator: Orchestrator,
    log: MessageLog,
    input: InputController,
    sink: Option<EventSink>,
}

impl Session {
    pub fn new(engine: GameEngine, oracle: Box<dyn Oracle>, agent: AgentConfig) -> Self {
        Self {
            engine,
            oracle,
            orchestrator: Orchestrator::new(agent),
            log: MessageLog::new(),
            input: InputController::new(),
            sink: None,
        }
    }

    /// New game, oracle and optional event log, all from configuration.
    pub fn from_config(config: &MarchlandsConfig) -> Result<Self> {
        let engine = GameEngine::new_game(&config.game)?;
        let oracle = build_oracle(&config.oracle)?;
        let mut session = Self::new(engine, oracle, config.agent.clone());
        if let Some(path) = &config.events_path {
            session.sink = Some(EventSink::new(path));
        }
        Ok(session)
    }

    pub fn with_sink(mut self, sink: EventSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.engine.snapshot()
    }

    /// Play autonomous turns back to back until the game ends, `max_rounds`
    /// rounds have completed (0 = no limit) or a human seat comes up.
    pub async fn run(&mut self, max_rounds: u32) -> Result<SessionSummary, GameError> {
        let mut turns_played = 0;

        let stop = loop {
            let state = self.engine.state();
            if let Some(winner) = state.winner {
                break StopReason::GameOver { winner };
            }
            if max_rounds > 0 && state.round > max_rounds {
                break StopReason::RoundLimit;
            }
            let Some(player) = self.engine.current_player() else {
                return Err(GameError::Invariant("no current player in a running game".into()));
            };
            if state.player(player).is_some_and(|p| p.is_human) {
                break StopReason::AwaitingHuman(player);
            }

            let report = self
                .orchestrator
                .play_turn(&mut self.engine, self.oracle.as_ref(), &mut self.log)
                .await?;
            self.record(&report.events);
            turns_played += 1;

            if !self.engine.is_game_over() {
                let events = self.engine.end_turn()?;
                self.record(&events);
            }
        };

        tracing::info!(stop = ?stop, round = self.engine.state().round, turns = turns_played, "session stopped");
        Ok(SessionSummary {
            stop,
            round: self.engine.state().round,
            turns_played,
            rankings: self.engine.state().rankings(),
        })
    }

    /// Interpret one human gesture for the current (human) player and apply
    /// the resulting action through the same path the decision loop uses.
    pub fn submit_input(&mut self, input: HumanInput) -> Result<InputOutcome, GameError> {
        let player = self.human_on_turn()?;
        let outcome = self.input.handle(self.engine.state(), player, input);

        if let InputOutcome::Negotiate { offer, with } = &outcome {
            self.negotiate(player, *offer, *with)?;
            return Ok(outcome);
        }
        if let InputOutcome::Submit(action) = &outcome {
            if action.is_end_turn() {
                self.end_human_turn()?;
                return Ok(outcome);
            }
            match self.engine.apply(player, action) {
                Ok(events) => self.record(&events),
                Err(err) => {
                    if let GameError::Rejected(reason) = &err {
                        let name = self.player_name(player);
                        self.log.push(player, &name, format!("Cannot {}: {reason}", action.kind()));
                    }
                    return Err(err);
                }
            }
        }
        Ok(outcome)
    }

    fn negotiate(&mut self, player: PlayerId, offer: DiplomaticOffer, other: PlayerId) -> Result<(), GameError> {
        let result = match offer {
            DiplomaticOffer::ProposeTreaty => self.engine.propose_treaty(player, other),
            DiplomaticOffer::BreakTreaty => self.engine.break_treaty(player, other),
            DiplomaticOffer::DeclareWar => self.engine.declare_war(player, other),
            DiplomaticOffer::ProposePeace => self.engine.propose_peace(player, other),
        };
        let name = self.player_name(player);
        let events = match result {
            Ok(events) => events,
            Err(err) => {
                if let GameError::Rejected(reason) = &err {
                    self.log.push(player, &name, format!("Cannot {}: {reason}", offer.describe()));
                }
                return Err(err);
            }
        };

        let other_name = self.player_name(other);
        let message = match offer {
            DiplomaticOffer::ProposeTreaty => format!("I propose a peace treaty to {other_name}."),
            DiplomaticOffer::BreakTreaty => format!("I break my treaty with {other_name}."),
            DiplomaticOffer::DeclareWar => format!("I declare war on {other_name}!"),
            DiplomaticOffer::ProposePeace => format!("I offer {other_name} an end to our war."),
        };
        self.log.push(player, &name, message);
        self.record(&events);
        Ok(())
    }

    pub fn end_human_turn(&mut self) -> Result<Vec<Event>, GameError> {
        self.human_on_turn()?;
        self.input.clear();
        let events = self.engine.end_turn()?;
        self.record(&events);
        Ok(events)
    }

    fn human_on_turn(&self) -> Result<PlayerId, GameError> {
        let player = self.engine.current_player().ok_or(GameError::GameOver)?;
        let is_human = self
            .engine
            .state()
            .player(player)
            .is_some_and(|p| p.is_human);
        if !is_human {
            return Err(RejectReason::NotYourTurn(player).into());
        }
        Ok(player)
    }

    fn player_name(&self, player: PlayerId) -> String {
        self.engine
            .state()
            .player(player)
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }

    fn record(&self, events: &[Event]) {
        for event in events {
            tracing::debug!(event = event.label(), "event");
        }
        if let Some(sink) = &self.sink {
            if let Err(err) = sink.emit_all(self.engine.state().round, events) {
                tracing::warn!(path = %sink.path().display(), error = %err, "failed to record events");
            }
        }
    }
}
