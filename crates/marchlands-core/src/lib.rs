mod behavior;
mod city;
mod config;
mod diplomacy;
mod engine;
mod entities;
mod error;
pub mod input;
mod negotiation;
mod player;
mod rng;
mod rules;
mod state;
mod territory;
mod turn;
mod unit;

pub use crate::behavior::*;
pub use crate::city::*;
pub use crate::config::*;
pub use crate::diplomacy::*;
pub use crate::engine::*;
pub use crate::entities::*;
pub use crate::error::*;
pub use crate::input::{HumanInput, InputController, InputOutcome, Selection};
pub use crate::player::*;
pub use crate::rng::*;
pub use crate::rules::{ATTACK_RANGE, MIN_CITY_DISTANCE};
pub use crate::state::*;
pub use crate::territory::*;
pub use crate::turn::{BORDER_RESPECT_FAVOR, BORDER_VIOLATION_FAVOR, TERRITORY_VIOLATION_FAVOR};
pub use crate::unit::*;
