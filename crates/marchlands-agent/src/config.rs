//! Configuration loading, from a YAML file such as `marchlands.yaml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use marchlands_core::GameConfig;

use crate::OracleKind;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarchlandsConfig {
    #[serde(default)]
    pub game: GameConfig,

    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub oracle: OracleConfig,

    /// JSONL event log; no log when unset.
    #[serde(default)]
    pub events_path: Option<PathBuf>,
}

/// Decision loop limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Loop iterations per autonomous turn before it is ended.
    #[serde(default = "default_max_iterations")]
    pub max_iterations_per_turn: usize,

    /// Pause after each applied action, for watching a game unfold.
    #[serde(default)]
    pub pacing_ms: u64,

    #[serde(default = "default_oracle_timeout")]
    pub oracle_timeout_secs: u64,
}

fn default_max_iterations() -> usize {
    32
}
fn default_oracle_timeout() -> u64 {
    60
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations_per_turn: default_max_iterations(),
            pacing_ms: 0,
            oracle_timeout_secs: default_oracle_timeout(),
        }
    }
}

impl AgentConfig {
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

/// Which oracle proposes actions, and where to reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default)]
    pub kind: OracleKind,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_model() -> String {
    "qwen2.5".to_string()
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            kind: OracleKind::default(),
            base_url: default_base_url(),
            model: default_model(),
        }
    }
}

impl MarchlandsConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` if given and present, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marchlands.yaml");
        std::fs::write(
            &path,
            "game:\n  grid_size: 40\n  seed: 7\noracle:\n  kind: ollama\n  model: llama3\n",
        )
        .unwrap();

        let config = MarchlandsConfig::load(&path).unwrap();
        assert_eq!(config.game.grid_size, 40);
        assert_eq!(config.game.seed, 7);
        assert_eq!(config.game.player_count, 8);
        assert_eq!(config.oracle.kind, OracleKind::Ollama);
        assert_eq!(config.oracle.model, "llama3");
        assert_eq!(config.oracle.base_url, "http://localhost:11434");
        assert_eq!(config.agent, AgentConfig::default());
        assert!(config.events_path.is_none());
    }

    #[test]
    fn missing_file_means_defaults_but_bad_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        let config = MarchlandsConfig::load_or_default(Some(&missing)).unwrap();
        assert_eq!(config.agent.max_iterations_per_turn, 32);

        let broken = dir.path().join("broken.yaml");
        std::fs::write(&broken, "game: [not, a, map]\n").unwrap();
        assert!(MarchlandsConfig::load_or_default(Some(&broken)).is_err());
    }
}
