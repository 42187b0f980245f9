//! Oracles - external, untrusted sources of proposed actions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Decision, DecisionRequest, HeuristicOracle, OllamaOracle, OracleConfig, OracleError};

/// Proposes actions for an autonomous player. Nothing it returns is trusted.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// One decision for the state described by `request`.
    async fn propose(&self, request: &DecisionRequest) -> Result<Decision, OracleError>;

    fn name(&self) -> &'static str;
}

/// Available oracle implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleKind {
    #[default]
    Heuristic,
    Ollama,
}

impl OracleKind {
    /// Parse oracle kind from name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "heuristic" => Some(Self::Heuristic),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Heuristic => "heuristic",
            Self::Ollama => "ollama",
        }
    }
}

/// Build the oracle described by `config`.
pub fn build_oracle(config: &OracleConfig) -> Result<Box<dyn Oracle>, OracleError> {
    let oracle: Box<dyn Oracle> = match config.kind {
        OracleKind::Heuristic => Box::new(HeuristicOracle::default()),
        OracleKind::Ollama => Box::new(OllamaOracle::new(&config.base_url, &config.model)?),
    };
    tracing::info!(oracle = oracle.name(), "oracle ready");
    Ok(oracle)
}
