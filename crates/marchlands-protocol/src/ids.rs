use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// Entity ids are plain integers handed out by a per-game arena.
///
/// Ids are never reused within one game instance, so a stale id simply stops
/// resolving instead of aliasing a newer entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T> {
    pub raw: u32,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

// Type-safe entity ids
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct UnitTag;
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CityTag;

pub type UnitId = Id<UnitTag>;
pub type CityId = Id<CityTag>;

/// Player id is a simple index assigned at game setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u8);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_numbers() {
        let unit = UnitId::new(7);
        assert_eq!(serde_json::to_string(&unit).unwrap(), "7");

        let back: CityId = serde_json::from_str("12").unwrap();
        assert_eq!(back, CityId::new(12));

        assert_eq!(serde_json::to_string(&PlayerId(3)).unwrap(), "3");
    }
}
