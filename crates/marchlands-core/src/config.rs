use serde::{Deserialize, Serialize};

use marchlands_protocol::PlayerId;

fn default_grid_size() -> i32 {
    100
}

fn default_player_count() -> u8 {
    8
}

fn default_seed() -> u64 {
    42
}

fn default_starting_coins() -> i32 {
    10
}

fn default_spawn_min_distance() -> f64 {
    3.0
}

fn default_max_rounds() -> u32 {
    200
}

/// Game setup parameters. Every field has a default so partial files load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_grid_size")]
    pub grid_size: i32,

    #[serde(default = "default_player_count")]
    pub player_count: u8,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_starting_coins")]
    pub starting_coins: i32,

    /// Minimum Euclidean distance between starting cities.
    #[serde(default = "default_spawn_min_distance")]
    pub spawn_min_distance: f64,

    /// Round limit for headless sessions; 0 means unlimited.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    /// Seats driven by human input instead of the decision loop.
    #[serde(default)]
    pub human_players: Vec<PlayerId>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            player_count: default_player_count(),
            seed: default_seed(),
            starting_coins: default_starting_coins(),
            spawn_min_distance: default_spawn_min_distance(),
            max_rounds: default_max_rounds(),
            human_players: Vec::new(),
        }
    }
}
