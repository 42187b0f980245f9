//! Shared vocabulary between the rules engine, decision sources and presentation.

mod action;
mod event;
mod ids;
mod menu;
mod snapshot;
mod tile;
mod types;

pub use crate::action::*;
pub use crate::event::*;
pub use crate::ids::*;
pub use crate::menu::*;
pub use crate::snapshot::*;
pub use crate::tile::*;
pub use crate::types::*;
