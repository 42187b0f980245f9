//! Marchlands agent - the decision loop for autonomous players.
//!
//! An [`Oracle`] proposes actions; the [`Orchestrator`] re-validates each one
//! against the live rules before applying it, records refusals, and ends the
//! turn when the plan runs out or the oracle fails. [`Session`] drives whole
//! games on top of it.

mod config;
mod decision;
mod error;
mod heuristic;
mod message_log;
mod observability;
mod ollama;
mod oracle;
mod orchestrator;
mod prompt;
mod request;
mod session;

pub use crate::config::*;
pub use crate::decision::*;
pub use crate::error::*;
pub use crate::heuristic::*;
pub use crate::message_log::*;
pub use crate::observability::*;
pub use crate::ollama::*;
pub use crate::oracle::*;
pub use crate::orchestrator::*;
pub use crate::prompt::*;
pub use crate::request::*;
pub use crate::session::*;
