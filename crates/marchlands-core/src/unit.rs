use serde::{Deserialize, Serialize};

use marchlands_protocol::{PlayerId, Tile, UnitId, UnitKind, UnitSnapshot};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub kind: UnitKind,
    pub owner: PlayerId,
    pub pos: Tile,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub movement: i32,
    pub has_moved: bool,
    pub has_attacked: bool,
    /// Founding or conquering this turn.
    pub has_acted: bool,
}

impl Unit {
    pub fn new(kind: UnitKind, owner: PlayerId, pos: Tile) -> Self {
        let stats = kind.stats();
        Self {
            kind,
            owner,
            pos,
            hp: stats.hp,
            max_hp: stats.hp,
            attack: stats.attack,
            movement: stats.movement,
            has_moved: false,
            has_attacked: false,
            has_acted: false,
        }
    }

    pub fn reset_turn(&mut self) {
        self.has_moved = false;
        self.has_attacked = false;
        self.has_acted = false;
    }

    /// Untouched this turn: required for founding and conquest.
    #[inline]
    pub fn is_fresh(&self) -> bool {
        !self.has_moved && !self.has_attacked && !self.has_acted
    }

    /// Applies flat damage, returning true if the unit died.
    pub fn take_damage(&mut self, damage: i32) -> bool {
        self.hp -= damage;
        self.hp <= 0
    }

    pub fn snapshot(&self, id: UnitId) -> UnitSnapshot {
        UnitSnapshot {
            id,
            owner: self.owner,
            kind: self.kind,
            pos: self.pos,
            hp: self.hp,
            max_hp: self.max_hp,
            has_moved: self.has_moved,
            has_attacked: self.has_attacked,
            has_acted: self.has_acted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_units_take_catalog_stats() {
        let knight = Unit::new(UnitKind::Knight, PlayerId(0), Tile::new(0, 0));
        assert_eq!((knight.hp, knight.max_hp), (8, 8));
        assert_eq!((knight.attack, knight.movement), (4, 2));
        assert!(knight.is_fresh());
    }

    #[test]
    fn damage_kills_at_zero() {
        let mut soldier = Unit::new(UnitKind::Soldier, PlayerId(0), Tile::new(0, 0));
        assert!(!soldier.take_damage(4));
        assert!(soldier.take_damage(1));
        assert_eq!(soldier.hp, 0);
    }
}
