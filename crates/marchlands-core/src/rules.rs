//! Legal action menu and per-action validation/application.
//!
//! Every apply re-derives legality from current state; a menu handed out
//! earlier is never trusted.

use marchlands_protocol::{
    Action, ActionKind, ActionMenu, AttackOption, AttackTarget, CityId, ConquerOption, Event,
    FoundOption, MoveOption, PlayerId, PurchaseOption, Tile, UnitId, UnitKind, UpgradeOption,
};

use crate::{GameError, GameState, RejectReason, Unit};

/// Euclidean reach of every attack (orthogonal or diagonal adjacency).
pub const ATTACK_RANGE: f64 = 1.5;
/// Minimum Chebyshev distance between a new city and every existing one.
pub const MIN_CITY_DISTANCE: i32 = 2;

impl GameState {
    /// Exhaustive set of legal parameterizations for `player` right now.
    pub fn legal_menu(&self, player: PlayerId) -> ActionMenu {
        let mut menu = ActionMenu::end_turn_only();
        let Some(p) = self.player(player) else {
            return menu;
        };

        for &city_id in &p.cities {
            let Some(city) = self.cities.get(city_id) else {
                continue;
            };
            let cost = city.upgrade_cost();
            if p.can_afford(cost) {
                menu.upgrade_city.push(UpgradeOption {
                    city_id,
                    level: city.level,
                    cost,
                });
            }

            if !self.purchased_this_turn && self.unit_at(city.pos).is_none() {
                let affordable: Vec<UnitKind> = UnitKind::ALL
                    .into_iter()
                    .filter(|k| p.can_afford(k.cost()))
                    .collect();
                if !affordable.is_empty() {
                    menu.buy_unit.push(PurchaseOption {
                        city_id,
                        position: city.pos,
                        affordable,
                    });
                }
            }
        }

        for &unit_id in &p.units {
            let Some(unit) = self.units.get(unit_id) else {
                continue;
            };

            if !unit.has_moved {
                menu.move_unit.push(MoveOption {
                    unit_id,
                    unit_type: unit.kind,
                    position: unit.pos,
                    movement: unit.movement,
                });
            }

            if !unit.has_attacked {
                let targets = self.targets_in_range(player, unit);
                if !targets.is_empty() {
                    menu.attack_unit.push(AttackOption {
                        unit_id,
                        unit_type: unit.kind,
                        position: unit.pos,
                        targets,
                    });
                }
            }

            if self.founding_blocker(unit).is_none() {
                menu.found_city.push(FoundOption {
                    unit_id,
                    position: unit.pos,
                });
            }

            if unit.is_fresh() {
                if let Some((city_id, city)) = self.city_at(unit.pos) {
                    if self.is_hostile(player, city.owner) {
                        menu.conquer_city.push(ConquerOption {
                            unit_id,
                            city_id,
                            city_owner: city.owner,
                            position: city.pos,
                        });
                    }
                }
            }
        }

        menu
    }

    fn targets_in_range(&self, player: PlayerId, attacker: &Unit) -> Vec<AttackTarget> {
        self.units
            .iter_ordered()
            .filter(|(_, u)| self.is_hostile(player, u.owner))
            .filter(|(_, u)| attacker.pos.euclidean(u.pos) <= ATTACK_RANGE)
            .map(|(unit_id, u)| AttackTarget {
                unit_id,
                owner: u.owner,
                unit_type: u.kind,
                position: u.pos,
                hp: u.hp,
            })
            .collect()
    }

    /// Why `unit` cannot found a city where it stands, if anything prevents it.
    fn founding_blocker(&self, unit: &Unit) -> Option<RejectReason> {
        if unit.kind != UnitKind::Colonizer {
            return Some(RejectReason::NotAColonizer(unit.kind));
        }
        if !unit.is_fresh() {
            return Some(RejectReason::NotInMenu {
                kind: ActionKind::FoundCity,
            });
        }
        self.cities
            .iter_ordered()
            .find(|(_, c)| c.pos.chebyshev(unit.pos) < MIN_CITY_DISTANCE)
            .map(|(_, c)| RejectReason::CityTooClose(c.pos))
    }

    fn owned_unit(&self, player: PlayerId, unit_id: UnitId) -> Result<&Unit, RejectReason> {
        let unit = self
            .units
            .get(unit_id)
            .ok_or(RejectReason::UnknownUnit(unit_id))?;
        if unit.owner != player {
            return Err(RejectReason::NotYourUnit(unit_id));
        }
        Ok(unit)
    }

    fn owned_city(&self, player: PlayerId, city_id: CityId) -> Result<&crate::City, RejectReason> {
        let city = self
            .cities
            .get(city_id)
            .ok_or(RejectReason::UnknownCity(city_id))?;
        if city.owner != player {
            return Err(RejectReason::NotYourCity(city_id));
        }
        Ok(city)
    }

    /// Checks `action` against a freshly computed menu plus the tile-level
    /// rules the menu does not enumerate. Never mutates.
    pub fn validate_action(&self, player: PlayerId, action: &Action) -> Result<(), RejectReason> {
        let menu = self.legal_menu(player);
        let coins = self.player(player).map(|p| p.coins).unwrap_or(0);

        match action {
            Action::UpgradeCity { city_id } => {
                let city = self.owned_city(player, *city_id)?;
                let cost = city.upgrade_cost();
                if coins < cost {
                    return Err(RejectReason::CannotAfford { cost, coins });
                }
            }
            Action::BuyUnit { city_id, unit_type } => {
                let city = self.owned_city(player, *city_id)?;
                if self.purchased_this_turn {
                    return Err(RejectReason::AlreadyPurchased);
                }
                if self.unit_at(city.pos).is_some() {
                    return Err(RejectReason::CityOccupied(*city_id));
                }
                let cost = unit_type.cost();
                if coins < cost {
                    return Err(RejectReason::CannotAfford { cost, coins });
                }
            }
            Action::MoveUnit { unit_id, x, y } => {
                let unit = self.owned_unit(player, *unit_id)?;
                if unit.has_moved {
                    return Err(RejectReason::AlreadyMoved(*unit_id));
                }
                let target = Tile::new(*x, *y);
                if !target.in_bounds(self.grid_size) {
                    return Err(RejectReason::OutOfBounds(target));
                }
                let distance = unit.pos.chebyshev(target);
                if distance > unit.movement {
                    return Err(RejectReason::OutOfRange {
                        target,
                        distance,
                        movement: unit.movement,
                    });
                }
                if self.unit_at(target).is_some() {
                    return Err(RejectReason::DestinationOccupied(target));
                }
                if self
                    .city_at(target)
                    .is_some_and(|(_, c)| c.owner == player)
                {
                    return Err(RejectReason::FriendlyCity(target));
                }
            }
            Action::AttackUnit { unit_id, x, y } => {
                let unit = self.owned_unit(player, *unit_id)?;
                if unit.has_attacked {
                    return Err(RejectReason::AlreadyAttacked(*unit_id));
                }
                let target = Tile::new(*x, *y);
                let in_reach = menu
                    .attack_option(*unit_id)
                    .is_some_and(|o| o.targets.iter().any(|t| t.position == target));
                if !in_reach {
                    return Err(RejectReason::NoTarget(target));
                }
            }
            Action::FoundCity { unit_id } => {
                let unit = self.owned_unit(player, *unit_id)?;
                if let Some(reason) = self.founding_blocker(unit) {
                    return Err(reason);
                }
            }
            Action::ConquerCity { unit_id } => {
                let unit = self.owned_unit(player, *unit_id)?;
                if !unit.is_fresh() {
                    return Err(RejectReason::AlreadyActed(*unit_id));
                }
                let (_, city) = self
                    .city_at(unit.pos)
                    .ok_or(RejectReason::NoCityHere(*unit_id))?;
                if !self.is_hostile(player, city.owner) {
                    return Err(RejectReason::ProtectedCity(city.owner));
                }
            }
            Action::EndTurn {} => return Ok(()),
            Action::AcceptPeaceTreaty { .. } | Action::RejectPeaceTreaty { .. } => {
                return Err(RejectReason::NotInMenu {
                    kind: action.kind(),
                });
            }
        }

        // The detailed checks above must agree with the menu.
        if !menu.offers(action) {
            return Err(RejectReason::NotInMenu {
                kind: action.kind(),
            });
        }
        Ok(())
    }

    /// Validate then mutate, atomically. Move-queue actions only; endTurn and
    /// diplomacy are handled by the turn controller and negotiation layer.
    pub(crate) fn apply_move(
        &mut self,
        player: PlayerId,
        action: &Action,
        events: &mut Vec<Event>,
    ) -> Result<(), GameError> {
        self.validate_action(player, action)?;

        match *action {
            Action::UpgradeCity { city_id } => self.upgrade_city(player, city_id, events),
            Action::BuyUnit { city_id, unit_type } => {
                self.buy_unit(player, city_id, unit_type, events)
            }
            Action::MoveUnit { unit_id, x, y } => self.move_unit(unit_id, Tile::new(x, y), events),
            Action::AttackUnit { unit_id, x, y } => {
                self.attack_unit(unit_id, Tile::new(x, y), events)
            }
            Action::FoundCity { unit_id } => self.found_city(player, unit_id, events),
            Action::ConquerCity { unit_id } => self.conquer_city(player, unit_id, events),
            Action::EndTurn {} | Action::AcceptPeaceTreaty { .. } | Action::RejectPeaceTreaty { .. } => {
                Err(GameError::Invariant(format!(
                    "{} routed to the move path",
                    action.kind()
                )))
            }
        }
    }

    fn upgrade_city(
        &mut self,
        player: PlayerId,
        city_id: CityId,
        events: &mut Vec<Event>,
    ) -> Result<(), GameError> {
        let grid = self.grid_size;
        let cost = self
            .cities
            .get(city_id)
            .map(|c| c.upgrade_cost())
            .ok_or(RejectReason::UnknownCity(city_id))?;
        let paid = self.player_mut(player).is_some_and(|p| p.spend(cost));
        if !paid {
            return Err(GameError::Invariant(format!(
                "validated upgrade of city {city_id} could not be paid"
            )));
        }
        let city = self
            .cities
            .get_mut(city_id)
            .ok_or(RejectReason::UnknownCity(city_id))?;
        city.upgrade(grid);
        events.push(Event::CityUpgraded {
            city: city_id,
            level: city.level,
            cost,
        });
        Ok(())
    }

    fn buy_unit(
        &mut self,
        player: PlayerId,
        city_id: CityId,
        kind: UnitKind,
        events: &mut Vec<Event>,
    ) -> Result<(), GameError> {
        let pos = self
            .cities
            .get(city_id)
            .map(|c| c.pos)
            .ok_or(RejectReason::UnknownCity(city_id))?;
        let cost = kind.cost();
        let paid = self.player_mut(player).is_some_and(|p| p.spend(cost));
        if !paid {
            return Err(GameError::Invariant(format!(
                "validated purchase of {kind} could not be paid"
            )));
        }
        let unit = self.add_unit(Unit::new(kind, player, pos));
        self.purchased_this_turn = true;
        events.push(Event::UnitPurchased {
            unit,
            city: city_id,
            owner: player,
            unit_type: kind,
            cost,
        });
        Ok(())
    }

    fn move_unit(&mut self, unit_id: UnitId, to: Tile, events: &mut Vec<Event>) -> Result<(), GameError> {
        let unit = self
            .units
            .get_mut(unit_id)
            .ok_or(RejectReason::UnknownUnit(unit_id))?;
        let from = unit.pos;
        unit.pos = to;
        unit.has_moved = true;
        events.push(Event::UnitMoved {
            unit: unit_id,
            from,
            to,
        });
        Ok(())
    }

    fn attack_unit(&mut self, unit_id: UnitId, at: Tile, events: &mut Vec<Event>) -> Result<(), GameError> {
        let (defender_id, _) = self.unit_at(at).ok_or(RejectReason::NoTarget(at))?;
        let attacker = self
            .units
            .get_mut(unit_id)
            .ok_or(RejectReason::UnknownUnit(unit_id))?;
        attacker.has_attacked = true;
        let damage = attacker.attack;

        let defender = self
            .units
            .get_mut(defender_id)
            .ok_or(RejectReason::UnknownUnit(defender_id))?;
        let died = defender.take_damage(damage);
        let defender_hp = defender.hp;
        let defender_owner = defender.owner;

        events.push(Event::UnitAttacked {
            attacker: unit_id,
            defender: defender_id,
            damage,
            defender_hp,
        });
        if died {
            self.remove_unit(defender_id);
            events.push(Event::UnitDied {
                unit: defender_id,
                owner: defender_owner,
            });
        }
        Ok(())
    }

    fn found_city(&mut self, player: PlayerId, unit_id: UnitId, events: &mut Vec<Event>) -> Result<(), GameError> {
        let pos = self
            .units
            .get(unit_id)
            .map(|u| u.pos)
            .ok_or(RejectReason::UnknownUnit(unit_id))?;
        // Placement re-check at the moment of founding.
        if let Some((_, other)) = self
            .cities
            .iter_ordered()
            .find(|(_, c)| c.pos.chebyshev(pos) < MIN_CITY_DISTANCE)
        {
            return Err(RejectReason::CityTooClose(other.pos).into());
        }

        self.remove_unit(unit_id);
        let city = self.add_city(player, pos);
        events.push(Event::CityFounded {
            city,
            owner: player,
            pos,
            colonizer: unit_id,
        });
        Ok(())
    }

    fn conquer_city(&mut self, player: PlayerId, unit_id: UnitId, events: &mut Vec<Event>) -> Result<(), GameError> {
        let pos = self
            .units
            .get(unit_id)
            .map(|u| u.pos)
            .ok_or(RejectReason::UnknownUnit(unit_id))?;
        let (city_id, previous) = self
            .city_at(pos)
            .map(|(id, c)| (id, c.owner))
            .ok_or(RejectReason::NoCityHere(unit_id))?;

        let grid = self.grid_size;
        let city = self
            .cities
            .get_mut(city_id)
            .ok_or(RejectReason::UnknownCity(city_id))?;
        city.transfer(player, grid);
        let level = city.level;

        if let Some(loser) = self.player_mut(previous) {
            loser.remove_city(city_id);
        }
        if let Some(winner) = self.player_mut(player) {
            winner.cities.push(city_id);
        }
        if let Some(unit) = self.units.get_mut(unit_id) {
            unit.has_acted = true;
        }
        events.push(Event::CityConquered {
            city: city_id,
            from: previous,
            to: player,
            level,
        });

        let loser_has_cities = self
            .player(previous)
            .is_some_and(|p| !p.cities.is_empty());
        if !loser_has_cities {
            self.eliminate(previous, Some(player), events);
        }
        Ok(())
    }
}
