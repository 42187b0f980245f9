use std::time::Duration;

use thiserror::Error;

/// Why the oracle produced no usable decision. Every variant is recovered
/// locally by ending the turn.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// Transport failure: connection refused, non-success status, bad body.
    #[error("oracle unreachable: {0}")]
    Unreachable(String),
    /// The reply arrived but does not have the expected shape.
    #[error("malformed decision: {0}")]
    Malformed(String),
    #[error("oracle did not answer within {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        OracleError::Unreachable(err.to_string())
    }
}
