use serde::{Deserialize, Serialize};

use crate::{CityId, PlayerId, Tile, UnitId, UnitKind};

/// All possible state-change notifications. Fully serializable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    // Game flow
    TurnStarted {
        round: u32,
        player: PlayerId,
    },
    TurnEnded {
        round: u32,
        player: PlayerId,
    },
    RoundStarted {
        round: u32,
    },
    IncomeCollected {
        player: PlayerId,
        amount: i32,
        balance: i32,
    },
    PlayerEliminated {
        player: PlayerId,
        by: Option<PlayerId>,
    },
    GameEnded {
        winner: PlayerId,
    },

    // Cities
    CityFounded {
        city: CityId,
        owner: PlayerId,
        pos: Tile,
        colonizer: UnitId,
    },
    CityUpgraded {
        city: CityId,
        level: u32,
        cost: i32,
    },
    CityConquered {
        city: CityId,
        from: PlayerId,
        to: PlayerId,
        level: u32,
    },

    // Units
    UnitPurchased {
        unit: UnitId,
        city: CityId,
        owner: PlayerId,
        unit_type: UnitKind,
        cost: i32,
    },
    UnitMoved {
        unit: UnitId,
        from: Tile,
        to: Tile,
    },
    UnitAttacked {
        attacker: UnitId,
        defender: UnitId,
        damage: i32,
        defender_hp: i32,
    },
    UnitDied {
        unit: UnitId,
        owner: PlayerId,
    },

    // Diplomacy
    FavorChanged {
        player: PlayerId,
        toward: PlayerId,
        delta: i32,
        favor: i32,
    },
    TreatyProposed {
        from: PlayerId,
        to: PlayerId,
    },
    TreatySigned {
        a: PlayerId,
        b: PlayerId,
    },
    TreatyRejected {
        proposer: PlayerId,
        rejector: PlayerId,
    },
    TreatyBroken {
        by: PlayerId,
        other: PlayerId,
    },
    WarDeclared {
        aggressor: PlayerId,
        target: PlayerId,
    },
    PeaceProposed {
        from: PlayerId,
        to: PlayerId,
    },
}

impl Event {
    /// Short label used by the JSONL sink and log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Event::TurnStarted { .. } => "turn_started",
            Event::TurnEnded { .. } => "turn_ended",
            Event::RoundStarted { .. } => "round_started",
            Event::IncomeCollected { .. } => "income_collected",
            Event::PlayerEliminated { .. } => "player_eliminated",
            Event::GameEnded { .. } => "game_ended",
            Event::CityFounded { .. } => "city_founded",
            Event::CityUpgraded { .. } => "city_upgraded",
            Event::CityConquered { .. } => "city_conquered",
            Event::UnitPurchased { .. } => "unit_purchased",
            Event::UnitMoved { .. } => "unit_moved",
            Event::UnitAttacked { .. } => "unit_attacked",
            Event::UnitDied { .. } => "unit_died",
            Event::FavorChanged { .. } => "favor_changed",
            Event::TreatyProposed { .. } => "treaty_proposed",
            Event::TreatySigned { .. } => "treaty_signed",
            Event::TreatyRejected { .. } => "treaty_rejected",
            Event::TreatyBroken { .. } => "treaty_broken",
            Event::WarDeclared { .. } => "war_declared",
            Event::PeaceProposed { .. } => "peace_proposed",
        }
    }
}
