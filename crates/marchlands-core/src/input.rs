//! Human input: turns a selection plus a target into the same `Action`
//! values the decision loop produces, so both go through one apply path.
//! Diplomacy gestures come out as an offer toward another player.

use marchlands_protocol::{Action, CityId, PlayerId, Tile, UnitId, UnitKind};

use crate::{DiplomaticOffer, GameState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    Unit(UnitId),
    City(CityId),
}

/// One discrete human gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HumanInput {
    ClickTile(Tile),
    UpgradeCity,
    BuyUnit(UnitKind),
    FoundCity,
    ConquerCity,
    EndTurn,
    ProposeTreaty(PlayerId),
    BreakTreaty(PlayerId),
    DeclareWar(PlayerId),
    ProposePeace(PlayerId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputOutcome {
    /// Route this through the engine.
    Submit(Action),
    /// A diplomatic move the player may make right now.
    Negotiate { offer: DiplomaticOffer, with: PlayerId },
    Selected(Selection),
    Cleared,
    /// The gesture means nothing in this context.
    Ignored(&'static str),
}

#[derive(Clone, Debug, Default)]
pub struct InputController {
    selected: Option<Selection>,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<Selection> {
        self.selected
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Interpret `input` for `player`. Legality is left to the engine.
    pub fn handle(&mut self, state: &GameState, player: PlayerId, input: HumanInput) -> InputOutcome {
        match input {
            HumanInput::EndTurn => {
                self.selected = None;
                InputOutcome::Submit(Action::end_turn())
            }
            HumanInput::ClickTile(tile) => self.click(state, player, tile),
            HumanInput::UpgradeCity => match self.selected {
                Some(Selection::City(city_id)) => InputOutcome::Submit(Action::UpgradeCity { city_id }),
                _ => InputOutcome::Ignored("select one of your cities first"),
            },
            HumanInput::BuyUnit(unit_type) => match self.selected {
                Some(Selection::City(city_id)) => {
                    InputOutcome::Submit(Action::BuyUnit { city_id, unit_type })
                }
                _ => InputOutcome::Ignored("select one of your cities first"),
            },
            HumanInput::FoundCity => match self.selected {
                Some(Selection::Unit(unit_id)) => {
                    self.selected = None;
                    InputOutcome::Submit(Action::FoundCity { unit_id })
                }
                _ => InputOutcome::Ignored("select a colonizer first"),
            },
            HumanInput::ConquerCity => match self.selected {
                Some(Selection::Unit(unit_id)) => InputOutcome::Submit(Action::ConquerCity { unit_id }),
                _ => InputOutcome::Ignored("select a unit standing on an enemy city first"),
            },
            HumanInput::ProposeTreaty(other) => negotiate(state, player, DiplomaticOffer::ProposeTreaty, other),
            HumanInput::BreakTreaty(other) => negotiate(state, player, DiplomaticOffer::BreakTreaty, other),
            HumanInput::DeclareWar(other) => negotiate(state, player, DiplomaticOffer::DeclareWar, other),
            HumanInput::ProposePeace(other) => negotiate(state, player, DiplomaticOffer::ProposePeace, other),
        }
    }

    fn click(&mut self, state: &GameState, player: PlayerId, tile: Tile) -> InputOutcome {
        let unit_here = state.unit_at(tile);

        if let Some(Selection::Unit(selected)) = self.selected {
            let own_selected = state.units.get(selected).is_some_and(|u| u.owner == player);
            if own_selected {
                match unit_here {
                    Some((_, other)) if other.owner != player => {
                        self.selected = None;
                        return InputOutcome::Submit(Action::AttackUnit {
                            unit_id: selected,
                            x: tile.x,
                            y: tile.y,
                        });
                    }
                    None => {
                        return InputOutcome::Submit(Action::MoveUnit {
                            unit_id: selected,
                            x: tile.x,
                            y: tile.y,
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        if let Some((unit_id, unit)) = unit_here {
            if unit.owner == player {
                let selection = Selection::Unit(unit_id);
                self.selected = Some(selection);
                return InputOutcome::Selected(selection);
            }
        }
        if let Some((city_id, city)) = state.city_at(tile) {
            if city.owner == player {
                let selection = Selection::City(city_id);
                self.selected = Some(selection);
                return InputOutcome::Selected(selection);
            }
        }

        self.selected = None;
        InputOutcome::Cleared
    }
}

/// Only the option the diplomacy panel would show toward `other` goes through.
fn negotiate(state: &GameState, player: PlayerId, offer: DiplomaticOffer, other: PlayerId) -> InputOutcome {
    if other == player || state.player(other).is_none() {
        return InputOutcome::Ignored("choose another player in the game");
    }
    let open = state
        .player(player)
        .is_some_and(|p| p.diplomacy.offerable(other).contains(&offer));
    if !open {
        return InputOutcome::Ignored("that offer is not open toward this player");
    }
    InputOutcome::Negotiate { offer, with: other }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Behavior, Player, Unit};

    fn board() -> (GameState, UnitId, UnitId, CityId) {
        let players = vec![
            Player::new(PlayerId(0), "a".into(), Behavior::Balanced, 10),
            Player::new(PlayerId(1), "b".into(), Behavior::Balanced, 10),
        ];
        let mut state = GameState::new_for_tests(20, players);
        let city = state.add_city(PlayerId(0), Tile::new(5, 5));
        let mine = state.add_unit(Unit::new(UnitKind::Knight, PlayerId(0), Tile::new(3, 3)));
        let theirs = state.add_unit(Unit::new(UnitKind::Soldier, PlayerId(1), Tile::new(4, 4)));
        (state, mine, theirs, city)
    }

    #[test]
    fn click_own_unit_then_empty_tile_moves() {
        let (state, mine, _, _) = board();
        let mut input = InputController::new();
        assert_eq!(
            input.handle(&state, PlayerId(0), HumanInput::ClickTile(Tile::new(3, 3))),
            InputOutcome::Selected(Selection::Unit(mine))
        );
        assert_eq!(
            input.handle(&state, PlayerId(0), HumanInput::ClickTile(Tile::new(2, 2))),
            InputOutcome::Submit(Action::MoveUnit { unit_id: mine, x: 2, y: 2 })
        );
    }

    #[test]
    fn click_enemy_with_unit_selected_attacks() {
        let (state, mine, _, _) = board();
        let mut input = InputController::new();
        input.handle(&state, PlayerId(0), HumanInput::ClickTile(Tile::new(3, 3)));
        assert_eq!(
            input.handle(&state, PlayerId(0), HumanInput::ClickTile(Tile::new(4, 4))),
            InputOutcome::Submit(Action::AttackUnit { unit_id: mine, x: 4, y: 4 })
        );
        assert_eq!(input.selected(), None);
    }

    #[test]
    fn city_panel_actions_need_a_city_selection() {
        let (state, _, _, city) = board();
        let mut input = InputController::new();
        assert!(matches!(
            input.handle(&state, PlayerId(0), HumanInput::BuyUnit(UnitKind::Soldier)),
            InputOutcome::Ignored(_)
        ));
        input.handle(&state, PlayerId(0), HumanInput::ClickTile(Tile::new(5, 5)));
        assert_eq!(
            input.handle(&state, PlayerId(0), HumanInput::BuyUnit(UnitKind::Colonizer)),
            InputOutcome::Submit(Action::BuyUnit {
                city_id: city,
                unit_type: UnitKind::Colonizer
            })
        );
    }

    #[test]
    fn diplomacy_gestures_follow_the_open_offers() {
        let (mut state, _, _, _) = board();
        for p in &mut state.players {
            p.diplomacy.initialize_relations(p.id, [PlayerId(0), PlayerId(1)]);
        }
        let mut input = InputController::new();
        assert_eq!(
            input.handle(&state, PlayerId(0), HumanInput::ProposeTreaty(PlayerId(1))),
            InputOutcome::Negotiate {
                offer: DiplomaticOffer::ProposeTreaty,
                with: PlayerId(1)
            }
        );
        assert!(matches!(
            input.handle(&state, PlayerId(0), HumanInput::DeclareWar(PlayerId(1))),
            InputOutcome::Ignored(_)
        ));
        assert!(matches!(
            input.handle(&state, PlayerId(0), HumanInput::ProposeTreaty(PlayerId(0))),
            InputOutcome::Ignored(_)
        ));
        assert!(matches!(
            input.handle(&state, PlayerId(0), HumanInput::ProposeTreaty(PlayerId(5))),
            InputOutcome::Ignored(_)
        ));

        state.players[0].diplomacy.change_favor(PlayerId(1), -60);
        assert_eq!(
            input.handle(&state, PlayerId(0), HumanInput::DeclareWar(PlayerId(1))),
            InputOutcome::Negotiate {
                offer: DiplomaticOffer::DeclareWar,
                with: PlayerId(1)
            }
        );
    }

    #[test]
    fn clicking_nothing_clears_the_selection() {
        let (state, _, _, _) = board();
        let mut input = InputController::new();
        input.handle(&state, PlayerId(0), HumanInput::ClickTile(Tile::new(3, 3)));
        input.clear();
        assert_eq!(
            input.handle(&state, PlayerId(0), HumanInput::ClickTile(Tile::new(10, 10))),
            InputOutcome::Cleared
        );
    }
}
