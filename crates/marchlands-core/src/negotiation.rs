//! Player-level diplomacy commands that keep both ledgers in step.

use marchlands_protocol::{Event, PlayerId};

use crate::{DiplomacyError, DiplomaticOffer, GameState};

impl GameState {
    fn check_pair(&self, a: PlayerId, b: PlayerId) -> Result<(), DiplomacyError> {
        if a == b {
            return Err(DiplomacyError::SamePlayer);
        }
        for id in [a, b] {
            if self.player(id).is_none() {
                return Err(DiplomacyError::UnknownPlayer(id));
            }
        }
        Ok(())
    }

    fn ledger_pair_mut(
        &mut self,
        a: PlayerId,
        b: PlayerId,
    ) -> Result<(&mut crate::Player, &mut crate::Player), DiplomacyError> {
        let ia = self.player_index(a).ok_or(DiplomacyError::UnknownPlayer(a))?;
        let ib = self.player_index(b).ok_or(DiplomacyError::UnknownPlayer(b))?;
        if ia == ib {
            return Err(DiplomacyError::SamePlayer);
        }
        if ia < ib {
            let (left, right) = self.players.split_at_mut(ib);
            Ok((&mut left[ia], &mut right[0]))
        } else {
            let (left, right) = self.players.split_at_mut(ia);
            Ok((&mut right[0], &mut left[ib]))
        }
    }

    /// `from` offers a peace treaty; it lands as a pending proposal on `to`.
    pub fn propose_treaty(
        &mut self,
        from: PlayerId,
        to: PlayerId,
        events: &mut Vec<Event>,
    ) -> Result<(), DiplomacyError> {
        self.check_pair(from, to)?;
        let (proposer, recipient) = self.ledger_pair_mut(from, to)?;
        if proposer.diplomacy.has_treaty(to) || recipient.diplomacy.has_treaty(from) {
            return Err(DiplomacyError::AlreadyAllied(to));
        }
        if proposer.diplomacy.is_at_war(to) {
            return Err(DiplomacyError::AtWar(to));
        }
        if proposer.diplomacy.has_pending_from(to) {
            return Err(DiplomacyError::OfferAwaitingAnswer(to));
        }
        if !recipient.diplomacy.receive_proposal(from) {
            return Err(DiplomacyError::DuplicateProposal(to));
        }
        events.push(Event::TreatyProposed { from, to });
        Ok(())
    }

    /// `acceptor` takes up the pending offer from `proposer`. Both sides sign.
    ///
    /// Refused while a war between them is still locked.
    pub fn accept_treaty(
        &mut self,
        proposer: PlayerId,
        acceptor: PlayerId,
        events: &mut Vec<Event>,
    ) -> Result<(), DiplomacyError> {
        self.check_pair(proposer, acceptor)?;
        let (offering, accepting) = self.ledger_pair_mut(proposer, acceptor)?;
        if let Some(turns_remaining) = accepting.diplomacy.war_locked(proposer) {
            return Err(DiplomacyError::WarLocked {
                enemy: proposer,
                turns_remaining,
            });
        }
        if !accepting.diplomacy.accept_proposal(proposer) {
            return Err(DiplomacyError::NoPendingProposal(proposer));
        }
        offering.diplomacy.sign_treaty(acceptor);
        tracing::info!(a = %proposer, b = %acceptor, "treaty signed");
        events.push(Event::TreatySigned {
            a: proposer,
            b: acceptor,
        });
        Ok(())
    }

    pub fn reject_treaty(
        &mut self,
        proposer: PlayerId,
        rejector: PlayerId,
        events: &mut Vec<Event>,
    ) -> Result<(), DiplomacyError> {
        self.check_pair(proposer, rejector)?;
        let (_, rejecting) = self.ledger_pair_mut(proposer, rejector)?;
        if !rejecting.diplomacy.reject_proposal(proposer) {
            return Err(DiplomacyError::NoPendingProposal(proposer));
        }
        events.push(Event::TreatyRejected { proposer, rejector });
        Ok(())
    }

    /// Both sides drop the treaty and pay the collateral favor penalty.
    pub fn break_treaty(
        &mut self,
        by: PlayerId,
        other: PlayerId,
        events: &mut Vec<Event>,
    ) -> Result<(), DiplomacyError> {
        self.check_pair(by, other)?;
        let (breaker, partner) = self.ledger_pair_mut(by, other)?;
        if !breaker.diplomacy.has_treaty(other) {
            return Err(DiplomacyError::NoTreaty(other));
        }
        breaker.diplomacy.break_treaty(other);
        partner.diplomacy.break_treaty(by);
        tracing::info!(by = %by, other = %other, "treaty broken");
        events.push(Event::TreatyBroken { by, other });
        Ok(())
    }

    /// Mirrored on both sides; an existing treaty is broken first.
    pub fn declare_war(
        &mut self,
        aggressor: PlayerId,
        target: PlayerId,
        events: &mut Vec<Event>,
    ) -> Result<(), DiplomacyError> {
        self.check_pair(aggressor, target)?;
        let (attacker, defender) = self.ledger_pair_mut(aggressor, target)?;
        if attacker.diplomacy.is_at_war(target) {
            return Err(DiplomacyError::AtWar(target));
        }
        let had_treaty = attacker.diplomacy.has_treaty(target);
        attacker.diplomacy.declare_war(target);
        defender.diplomacy.declare_war(aggressor);
        if had_treaty {
            events.push(Event::TreatyBroken {
                by: aggressor,
                other: target,
            });
        }
        tracing::info!(aggressor = %aggressor, target = %target, "war declared");
        events.push(Event::WarDeclared { aggressor, target });
        Ok(())
    }

    /// Offer peace once the war lock has expired. Accepting it ends the war.
    pub fn propose_peace(
        &mut self,
        from: PlayerId,
        to: PlayerId,
        events: &mut Vec<Event>,
    ) -> Result<(), DiplomacyError> {
        self.check_pair(from, to)?;
        let (proposer, recipient) = self.ledger_pair_mut(from, to)?;
        let Some(war) = proposer.diplomacy.war_with(to) else {
            return Err(DiplomacyError::NotAtWar(to));
        };
        if war.turns_remaining > 0 {
            return Err(DiplomacyError::WarLocked {
                enemy: to,
                turns_remaining: war.turns_remaining,
            });
        }
        if proposer.diplomacy.has_pending_from(to) {
            return Err(DiplomacyError::OfferAwaitingAnswer(to));
        }
        if !recipient.diplomacy.receive_proposal(from) {
            return Err(DiplomacyError::DuplicateProposal(to));
        }
        events.push(Event::PeaceProposed { from, to });
        Ok(())
    }

    /// What `player` could offer each active counterpart right now.
    /// Counterparts with nothing on offer are left out.
    pub fn offerable_diplomacy(&self, player: PlayerId) -> Vec<(PlayerId, Vec<DiplomaticOffer>)> {
        let Some(own) = self.player(player) else {
            return Vec::new();
        };
        self.players
            .iter()
            .filter(|other| other.id != player)
            .map(|other| (other.id, own.diplomacy.offerable(other.id)))
            .filter(|(_, offers)| !offers.is_empty())
            .collect()
    }
}
