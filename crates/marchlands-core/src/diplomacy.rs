//! Per-player diplomacy ledger: favor, treaties, wars and pending proposals.
//!
//! Each player owns one ledger describing its side of every relationship.
//! Mirroring a change onto the counterpart's ledger is the game layer's job.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use marchlands_protocol::PlayerId;

pub const FAVOR_MIN: i32 = -100;
pub const FAVOR_MAX: i32 = 100;
/// Turns a fresh war must run before peace can be proposed.
pub const WAR_LOCK_TURNS: u32 = 10;
/// Coins each active treaty adds to income per round.
pub const TREATY_BONUS_COINS: i32 = 2;
pub const TREATY_SIGNED_FAVOR: i32 = 20;
pub const TREATY_REJECTED_FAVOR: i32 = -10;
/// Paid toward every third party when a treaty is broken.
pub const TREATY_BROKEN_COLLATERAL: i32 = -15;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treaty {
    pub partner: PlayerId,
    pub turns_active: u32,
    pub bonus_coins: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct War {
    pub enemy: PlayerId,
    pub turns_remaining: u32,
}

/// Coarse reading of a favor value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    Friendly,
    Neutral,
    Hostile,
}

impl Relation {
    pub fn from_favor(favor: i32) -> Self {
        if favor > 50 {
            Relation::Friendly
        } else if favor < -50 {
            Relation::Hostile
        } else {
            Relation::Neutral
        }
    }
}

/// A diplomatic move a player could make toward a counterpart right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiplomaticOffer {
    BreakTreaty,
    ProposePeace,
    ProposeTreaty,
    DeclareWar,
}

impl DiplomaticOffer {
    pub fn describe(self) -> &'static str {
        match self {
            DiplomaticOffer::BreakTreaty => "break a treaty",
            DiplomaticOffer::ProposePeace => "propose peace",
            DiplomaticOffer::ProposeTreaty => "propose a treaty",
            DiplomaticOffer::DeclareWar => "declare war",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiplomacyLedger {
    favor: BTreeMap<PlayerId, i32>,
    treaties: Vec<Treaty>,
    wars: Vec<War>,
    /// Players whose treaty proposal awaits our answer, oldest first.
    pending: Vec<PlayerId>,
}

impl DiplomacyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at neutral favor with everyone except `own`.
    pub fn initialize_relations(&mut self, own: PlayerId, players: impl IntoIterator<Item = PlayerId>) {
        for player in players {
            if player != own {
                self.favor.insert(player, 0);
            }
        }
    }

    pub fn favor(&self, toward: PlayerId) -> i32 {
        self.favor.get(&toward).copied().unwrap_or(0)
    }

    /// Every known counterpart with our current favor toward them.
    pub fn favor_entries(&self) -> impl Iterator<Item = (PlayerId, i32)> + '_ {
        self.favor.iter().map(|(p, f)| (*p, *f))
    }

    pub fn relation(&self, toward: PlayerId) -> Relation {
        Relation::from_favor(self.favor(toward))
    }

    /// Adjust favor, clamped to [-100, 100]. Returns the new value.
    pub fn change_favor(&mut self, toward: PlayerId, delta: i32) -> i32 {
        let entry = self.favor.entry(toward).or_insert(0);
        *entry = (*entry + delta).clamp(FAVOR_MIN, FAVOR_MAX);
        *entry
    }

    fn set_favor(&mut self, toward: PlayerId, value: i32) {
        self.favor
            .insert(toward, value.clamp(FAVOR_MIN, FAVOR_MAX));
    }

    pub fn treaties(&self) -> &[Treaty] {
        &self.treaties
    }

    pub fn wars(&self) -> &[War] {
        &self.wars
    }

    pub fn pending(&self) -> &[PlayerId] {
        &self.pending
    }

    pub fn has_treaty(&self, with: PlayerId) -> bool {
        self.treaties.iter().any(|t| t.partner == with)
    }

    pub fn is_at_war(&self, with: PlayerId) -> bool {
        self.wars.iter().any(|w| w.enemy == with)
    }

    pub fn war_with(&self, with: PlayerId) -> Option<&War> {
        self.wars.iter().find(|w| w.enemy == with)
    }

    pub fn has_pending_from(&self, from: PlayerId) -> bool {
        self.pending.contains(&from)
    }

    /// Record an incoming proposal. Returns false on a duplicate.
    pub fn receive_proposal(&mut self, from: PlayerId) -> bool {
        if self.pending.contains(&from) {
            return false;
        }
        self.pending.push(from);
        true
    }

    fn take_pending(&mut self, from: PlayerId) -> bool {
        match self.pending.iter().position(|p| *p == from) {
            Some(index) => {
                self.pending.remove(index);
                true
            }
            None => false,
        }
    }

    /// Register a treaty with `partner`, ending any war with them. +20 favor.
    /// A proposal still pending from `partner` is settled by the signing.
    pub fn sign_treaty(&mut self, partner: PlayerId) {
        self.wars.retain(|w| w.enemy != partner);
        self.pending.retain(|p| *p != partner);
        if !self.has_treaty(partner) {
            self.treaties.push(Treaty {
                partner,
                turns_active: 0,
                bonus_coins: TREATY_BONUS_COINS,
            });
        }
        self.change_favor(partner, TREATY_SIGNED_FAVOR);
    }

    /// Accept a pending proposal from `from`. Returns false if none was
    /// pending or the war with `from` is still locked.
    pub fn accept_proposal(&mut self, from: PlayerId) -> bool {
        if self.war_locked(from).is_some() || !self.take_pending(from) {
            return false;
        }
        self.sign_treaty(from);
        true
    }

    /// Reject a pending proposal; costs the proposer 10 favor on this ledger.
    pub fn reject_proposal(&mut self, from: PlayerId) -> bool {
        if !self.take_pending(from) {
            return false;
        }
        self.change_favor(from, TREATY_REJECTED_FAVOR);
        true
    }

    /// Drop the treaty with `target`: favor with them to -100, -15 with everyone else.
    pub fn break_treaty(&mut self, target: PlayerId) -> bool {
        let Some(index) = self.treaties.iter().position(|t| t.partner == target) else {
            return false;
        };
        self.treaties.remove(index);
        self.set_favor(target, FAVOR_MIN);

        let others: Vec<PlayerId> = self
            .favor
            .keys()
            .copied()
            .filter(|p| *p != target)
            .collect();
        for other in others {
            self.change_favor(other, TREATY_BROKEN_COLLATERAL);
        }
        true
    }

    /// Break any treaty first, then open a war locked for ten turns.
    /// Any proposal pending from `target` is void. Returns false if already at war.
    pub fn declare_war(&mut self, target: PlayerId) -> bool {
        if self.has_treaty(target) {
            self.break_treaty(target);
        }
        self.pending.retain(|p| *p != target);
        if self.is_at_war(target) {
            return false;
        }
        self.set_favor(target, FAVOR_MIN);
        self.wars.push(War {
            enemy: target,
            turns_remaining: WAR_LOCK_TURNS,
        });
        true
    }

    /// Turns left on the war lock with `enemy`, if a locked war is running.
    pub fn war_locked(&self, enemy: PlayerId) -> Option<u32> {
        self.war_with(enemy)
            .map(|w| w.turns_remaining)
            .filter(|turns| *turns > 0)
    }

    /// Peace is proposable only once the war lock has run out.
    pub fn can_propose_peace(&self, target: PlayerId) -> bool {
        self.war_with(target)
            .is_some_and(|w| w.turns_remaining == 0)
    }

    /// Sum of per-round treaty bonuses.
    pub fn treaty_income(&self) -> i32 {
        self.treaties.iter().map(|t| t.bonus_coins).sum()
    }

    /// End-of-turn bookkeeping: age treaties, count down war locks.
    pub fn process_turn(&mut self) {
        for treaty in &mut self.treaties {
            treaty.turns_active += 1;
        }
        for war in &mut self.wars {
            war.turns_remaining = war.turns_remaining.saturating_sub(1);
        }
    }

    /// Remove every trace of an eliminated player.
    pub fn forget(&mut self, player: PlayerId) {
        self.favor.remove(&player);
        self.treaties.retain(|t| t.partner != player);
        self.wars.retain(|w| w.enemy != player);
        self.pending.retain(|p| *p != player);
    }

    /// What this player could offer `toward` right now.
    ///
    /// The options are exclusive and checked in order: an ally can only be
    /// abandoned, an enemy only offered peace, and otherwise favor decides
    /// between courting and war.
    pub fn offerable(&self, toward: PlayerId) -> Vec<DiplomaticOffer> {
        let favor = self.favor(toward);
        let offer = if self.has_treaty(toward) {
            Some(DiplomaticOffer::BreakTreaty)
        } else if self.is_at_war(toward) {
            self.can_propose_peace(toward)
                .then_some(DiplomaticOffer::ProposePeace)
        } else if favor >= 0 {
            Some(DiplomaticOffer::ProposeTreaty)
        } else if favor < -50 {
            Some(DiplomaticOffer::DeclareWar)
        } else {
            None
        };
        offer.into_iter().collect()
    }
}
