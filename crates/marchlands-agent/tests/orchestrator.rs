use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use marchlands_agent::{
    AgentConfig, Decision, DecisionRequest, HeuristicOracle, MessageLog, Oracle, OracleError,
    Orchestrator, Session, StopReason, TurnEnd, NOTHING_TO_DO,
};
use marchlands_core::{
    Behavior, DiplomaticOffer, GameConfig, GameEngine, GameError, GameState,
    HumanInput, InputOutcome, Player, RejectReason,
};
use marchlands_protocol::{PlayerId, ProposedAction, Tile, UnitKind};

const X: PlayerId = PlayerId(0);
const Y: PlayerId = PlayerId(1);

/// Replays canned replies and remembers what it was asked.
#[derive(Default)]
struct ScriptedOracle {
    replies: Mutex<VecDeque<Result<Decision, OracleError>>>,
    seen_failures: Mutex<Vec<usize>>,
}

impl ScriptedOracle {
    fn new(replies: Vec<Result<Decision, OracleError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen_failures: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.seen_failures.lock().unwrap().len()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn propose(&self, request: &DecisionRequest) -> Result<Decision, OracleError> {
        self.seen_failures.lock().unwrap().push(request.failures.len());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Decision::end_turn("script exhausted")))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

struct SlowOracle;

#[async_trait]
impl Oracle for SlowOracle {
    async fn propose(&self, _request: &DecisionRequest) -> Result<Decision, OracleError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Decision::end_turn("too late"))
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

fn engine_with(count: u8, grid: i32) -> GameEngine {
    let players: Vec<Player> = (0..count)
        .map(|i| Player::new(PlayerId(i), format!("Player {i}"), Behavior::Balanced, 10))
        .collect();
    let ids: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
    let mut state = GameState::new_for_tests(grid, players);
    for p in &mut state.players {
        p.diplomacy.initialize_relations(p.id, ids.iter().copied());
    }
    GameEngine::from_state(state)
}

fn buy(city: u32, unit: &str) -> ProposedAction {
    ProposedAction::new("buyUnit", json!({ "cityId": city, "unitType": unit }))
}

#[tokio::test]
async fn nothing_legal_ends_the_turn_without_asking() {
    let mut engine = engine_with(2, 10);
    engine.state_mut().players[0].coins = 0;
    let oracle = ScriptedOracle::default();
    let mut log = MessageLog::new();

    let report = Orchestrator::new(AgentConfig::default())
        .play_turn(&mut engine, &oracle, &mut log)
        .await
        .unwrap();

    assert_eq!(report.end, TurnEnd::NothingToDo);
    assert_eq!(report.iterations, 1);
    assert_eq!(report.oracle_calls, 0);
    assert_eq!(oracle.calls(), 0);
    assert_eq!(log.latest().map(|e| e.message.as_str()), Some(NOTHING_TO_DO));
}

#[tokio::test]
async fn refused_actions_are_shown_on_the_next_request() {
    let mut engine = engine_with(2, 10);
    let city = engine.state_mut().add_city(X, Tile::new(2, 2));
    let oracle = ScriptedOracle::new(vec![
        Ok(Decision::new(
            "settle the east",
            vec![ProposedAction::new("foundCity", json!({ "unitId": 99 }))],
        )),
        Ok(Decision::new(
            "build instead",
            vec![buy(city.raw, "colonizer"), ProposedAction::end_turn()],
        )),
    ]);
    let mut log = MessageLog::new();

    let report = Orchestrator::new(AgentConfig::default())
        .play_turn(&mut engine, &oracle, &mut log)
        .await
        .unwrap();

    assert_eq!(report.end, TurnEnd::EndTurn);
    assert_eq!(report.oracle_calls, 2);
    assert_eq!(*oracle.seen_failures.lock().unwrap(), vec![0, 1]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].action.action, "foundCity");
    assert_eq!(report.applied, 1);
    // The first stated intention is the one kept for the turn.
    assert_eq!(report.intention.as_deref(), Some("settle the east"));
    assert_eq!(engine.state().players[0].units.len(), 1);
}

#[tokio::test]
async fn a_multi_action_plan_is_consumed_without_asking_again() {
    let mut engine = engine_with(2, 10);
    let city = engine.state_mut().add_city(X, Tile::new(2, 2));
    let oracle = ScriptedOracle::new(vec![Ok(Decision::new(
        "expand",
        vec![
            buy(city.raw, "colonizer"),
            ProposedAction::new("moveUnit", json!({ "unitId": 1, "x": 3, "y": 3 })),
            ProposedAction::end_turn(),
            ProposedAction::new("moveUnit", json!({ "unitId": 1, "x": 4, "y": 4 })),
        ],
    ))]);
    let mut log = MessageLog::new();

    let report = Orchestrator::new(AgentConfig::default())
        .play_turn(&mut engine, &oracle, &mut log)
        .await
        .unwrap();

    assert_eq!(report.end, TurnEnd::EndTurn);
    assert_eq!(oracle.calls(), 1);
    assert_eq!(report.applied, 2);
    let unit = engine.state().players[0].units[0];
    assert_eq!(engine.state().units.get(unit).map(|u| u.pos), Some(Tile::new(3, 3)));
    // The turn itself is advanced by the caller.
    assert_eq!(engine.current_player(), Some(X));
}

#[tokio::test]
async fn treaty_answers_take_effect_before_moves() {
    let mut engine = engine_with(2, 10);
    engine.state_mut().add_city(X, Tile::new(2, 2));
    engine
        .state_mut()
        .propose_treaty(Y, X, &mut Vec::new())
        .unwrap();
    let oracle = ScriptedOracle::new(vec![Ok(Decision::new(
        "make friends",
        vec![
            ProposedAction::new("acceptPeaceTreaty", json!({ "playerId": 1 })),
            ProposedAction::end_turn(),
        ],
    ))]);
    let mut log = MessageLog::new();

    let report = Orchestrator::new(AgentConfig::default())
        .play_turn(&mut engine, &oracle, &mut log)
        .await
        .unwrap();

    assert_eq!(report.end, TurnEnd::EndTurn);
    assert!(engine.state().players[0].diplomacy.has_treaty(Y));
    assert!(engine.state().players[1].diplomacy.has_treaty(X));
    assert!(log
        .entries()
        .any(|e| e.message.starts_with("I accept the peace treaty from Player 1")));
}

#[tokio::test]
async fn oracle_failures_end_the_turn_with_nothing_applied() {
    for failure in [
        OracleError::Unreachable("connection refused".into()),
        OracleError::Malformed("no intention".into()),
    ] {
        let mut engine = engine_with(2, 10);
        engine.state_mut().add_city(X, Tile::new(2, 2));
        let before = engine.snapshot();
        let oracle = ScriptedOracle::new(vec![Err(failure.clone())]);
        let mut log = MessageLog::new();

        let report = Orchestrator::new(AgentConfig::default())
            .play_turn(&mut engine, &oracle, &mut log)
            .await
            .unwrap();

        assert_eq!(report.end, TurnEnd::OracleFailed(failure));
        assert_eq!(report.applied, 0);
        assert_eq!(engine.snapshot(), before);
        assert_eq!(log.len(), 1);
    }
}

#[tokio::test]
async fn slow_oracles_time_out() {
    let mut engine = engine_with(2, 10);
    engine.state_mut().add_city(X, Tile::new(2, 2));
    let config = AgentConfig {
        oracle_timeout_secs: 1,
        ..AgentConfig::default()
    };
    let mut log = MessageLog::new();

    let report = Orchestrator::new(config)
        .play_turn(&mut engine, &SlowOracle, &mut log)
        .await
        .unwrap();

    assert_eq!(
        report.end,
        TurnEnd::OracleFailed(OracleError::Timeout(Duration::from_secs(1)))
    );
}

#[tokio::test]
async fn endless_refusals_hit_the_iteration_cap() {
    let mut engine = engine_with(2, 10);
    engine.state_mut().add_city(X, Tile::new(2, 2));
    let nonsense = || Ok(Decision::new("dance", vec![ProposedAction::new("dance", json!({}))]));
    let oracle = ScriptedOracle::new((0..10).map(|_| nonsense()).collect());
    let config = AgentConfig {
        max_iterations_per_turn: 3,
        ..AgentConfig::default()
    };
    let mut log = MessageLog::new();

    let report = Orchestrator::new(config)
        .play_turn(&mut engine, &oracle, &mut log)
        .await
        .unwrap();

    assert_eq!(report.end, TurnEnd::IterationCap);
    assert_eq!(report.iterations, 3);
    assert_eq!(report.failures.len(), 3);
    assert_eq!(oracle.calls(), 3);
}

#[tokio::test]
async fn headless_heuristic_games_stop_at_the_round_limit() {
    let config = GameConfig {
        grid_size: 24,
        player_count: 3,
        seed: 7,
        ..GameConfig::default()
    };
    let engine = GameEngine::new_game(&config).unwrap();
    let mut session = Session::new(engine, Box::new(HeuristicOracle::default()), AgentConfig::default());

    let summary = session.run(3).await.unwrap();

    match summary.stop {
        StopReason::RoundLimit => assert_eq!(summary.round, 4),
        StopReason::GameOver { .. } => assert!(summary.round <= 3),
        StopReason::AwaitingHuman(p) => panic!("no humans seated, but stopped for {p}"),
    }
    assert!(summary.turns_played >= 3);
    assert!(!summary.rankings.is_empty());
    session.engine().check_invariants().unwrap();
}

#[tokio::test]
async fn human_seats_pause_the_session() {
    let config = GameConfig {
        grid_size: 16,
        player_count: 2,
        human_players: vec![X],
        ..GameConfig::default()
    };
    let engine = GameEngine::new_game(&config).unwrap();
    let mut session = Session::new(engine, Box::new(HeuristicOracle::default()), AgentConfig::default());

    let summary = session.run(0).await.unwrap();
    assert_eq!(summary.stop, StopReason::AwaitingHuman(X));
    assert_eq!(summary.turns_played, 0);

    let state = session.engine().state();
    let city = state.players[0].cities[0];
    let pos = state.cities.get(city).map(|c| c.pos).unwrap();

    assert!(matches!(
        session.submit_input(HumanInput::ClickTile(pos)).unwrap(),
        InputOutcome::Selected(_)
    ));
    assert!(matches!(
        session.submit_input(HumanInput::BuyUnit(UnitKind::Colonizer)).unwrap(),
        InputOutcome::Submit(_)
    ));
    assert_eq!(session.engine().state().players[0].units.len(), 1);

    // A second purchase is refused by the same rules the loop obeys.
    assert_eq!(
        session.submit_input(HumanInput::BuyUnit(UnitKind::Colonizer)),
        Err(GameError::Rejected(RejectReason::AlreadyPurchased))
    );

    session.submit_input(HumanInput::EndTurn).unwrap();
    assert_eq!(session.engine().current_player(), Some(Y));
    assert_eq!(
        session.end_human_turn(),
        Err(GameError::Rejected(RejectReason::NotYourTurn(Y)))
    );

    let summary = session.run(0).await.unwrap();
    assert_eq!(summary.stop, StopReason::AwaitingHuman(X));
    assert_eq!(summary.turns_played, 1);
}

#[tokio::test]
async fn a_human_treaty_offer_is_answered_by_the_autonomous_seat() {
    let config = GameConfig {
        grid_size: 16,
        player_count: 2,
        human_players: vec![X],
        ..GameConfig::default()
    };
    let engine = GameEngine::new_game(&config).unwrap();
    let mut session = Session::new(engine, Box::new(HeuristicOracle::default()), AgentConfig::default());
    assert_eq!(session.run(0).await.unwrap().stop, StopReason::AwaitingHuman(X));

    // Favor is neutral: war is not on the table yet.
    assert!(matches!(
        session.submit_input(HumanInput::DeclareWar(Y)).unwrap(),
        InputOutcome::Ignored(_)
    ));
    assert_eq!(
        session.submit_input(HumanInput::ProposeTreaty(Y)).unwrap(),
        InputOutcome::Negotiate {
            offer: DiplomaticOffer::ProposeTreaty,
            with: Y
        }
    );
    assert!(session
        .engine()
        .state()
        .player(Y)
        .is_some_and(|p| p.diplomacy.has_pending_from(X)));
    assert!(session
        .log()
        .latest()
        .is_some_and(|e| e.message.starts_with("I propose a peace treaty to")));

    session.submit_input(HumanInput::EndTurn).unwrap();
    let summary = session.run(0).await.unwrap();
    assert_eq!(summary.stop, StopReason::AwaitingHuman(X));

    let state = session.engine().state();
    assert!(state.has_treaty(X, Y) && state.has_treaty(Y, X));
    assert!(session
        .log()
        .entries()
        .any(|e| e.message.starts_with("I accept the peace treaty from")));

    assert_eq!(
        session.submit_input(HumanInput::BreakTreaty(Y)).unwrap(),
        InputOutcome::Negotiate {
            offer: DiplomaticOffer::BreakTreaty,
            with: Y
        }
    );
    assert!(!session.engine().state().has_treaty(X, Y));
    assert!(matches!(
        session.submit_input(HumanInput::ProposeTreaty(Y)).unwrap(),
        InputOutcome::Ignored(_)
    ));
}
