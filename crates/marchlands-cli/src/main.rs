//! Marchlands CLI.
//!
//! - `marchlands play` - headless self-play between autonomous players
//! - `marchlands rules` - unit catalog and behavior profiles
//! - `marchlands events` - tail a recorded event log
//! - `marchlands init` - write a default configuration file

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use marchlands_agent::{EventSink, MarchlandsConfig, OracleKind, Session, StopReason};
use marchlands_core::Behavior;
use marchlands_protocol::UnitKind;

const DEFAULT_CONFIG: &str = "marchlands.yaml";

#[derive(Parser)]
#[command(name = "marchlands")]
#[command(about = "Turn-based territorial strategy with autonomous players", version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a headless game
    Play {
        #[arg(long)]
        seed: Option<u64>,

        /// Number of players
        #[arg(long)]
        players: Option<u8>,

        /// Grid side length
        #[arg(long)]
        grid: Option<i32>,

        /// Stop after this many rounds (0 = until someone wins)
        #[arg(long)]
        rounds: Option<u32>,

        /// Decision source: heuristic or ollama
        #[arg(long)]
        oracle: Option<String>,

        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        base_url: Option<String>,

        /// Append every event to this JSONL file
        #[arg(long)]
        events: Option<PathBuf>,

        /// Pause after each applied action, in milliseconds
        #[arg(long)]
        pacing_ms: Option<u64>,
    },

    /// Print the unit catalog and behavior profiles
    Rules,

    /// Show the most recent recorded events
    Events {
        path: PathBuf,

        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Write a default configuration file
    Init {
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Play {
            seed,
            players,
            grid,
            rounds,
            oracle,
            model,
            base_url,
            events,
            pacing_ms,
        } => {
            let mut config = MarchlandsConfig::load_or_default(cli.config.as_deref())?;
            if let Some(seed) = seed {
                config.game.seed = seed;
            }
            if let Some(players) = players {
                config.game.player_count = players;
            }
            if let Some(grid) = grid {
                config.game.grid_size = grid;
            }
            if let Some(rounds) = rounds {
                config.game.max_rounds = rounds;
            }
            if let Some(name) = oracle {
                config.oracle.kind = match OracleKind::from_name(&name) {
                    Some(kind) => kind,
                    None => bail!("Unknown oracle '{}', expected heuristic or ollama", name),
                };
            }
            if let Some(model) = model {
                config.oracle.model = model;
            }
            if let Some(base_url) = base_url {
                config.oracle.base_url = base_url;
            }
            if events.is_some() {
                config.events_path = events;
            }
            if let Some(pacing_ms) = pacing_ms {
                config.agent.pacing_ms = pacing_ms;
            }
            play(&config).await
        }
        Commands::Rules => {
            show_rules();
            Ok(())
        }
        Commands::Events { path, limit } => show_events(&path, limit),
        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
            init_config(&path, force)
        }
    }
}

async fn play(config: &MarchlandsConfig) -> Result<()> {
    tracing::info!(
        players = config.game.player_count,
        grid = config.game.grid_size,
        seed = config.game.seed,
        oracle = config.oracle.kind.name(),
        "Starting game"
    );

    let mut session = Session::from_config(config).context("Failed to set up game")?;
    let summary = session
        .run(config.game.max_rounds)
        .await
        .context("Game halted")?;

    println!("Marchlands");
    println!("==========");
    println!();
    match &summary.stop {
        StopReason::GameOver { winner } => {
            let name = session
                .engine()
                .state()
                .player(*winner)
                .map(|p| p.name.as_str())
                .unwrap_or("unknown");
            println!("Winner: {} after {} rounds", name, summary.round);
        }
        StopReason::RoundLimit => {
            println!("Round limit reached ({} rounds)", summary.round.saturating_sub(1));
        }
        StopReason::AwaitingHuman(player) => {
            println!("Stopped: player {} is human-controlled", player);
        }
    }
    println!("Turns played: {}", summary.turns_played);
    println!();
    println!("Rankings:");
    for (rank, entry) in summary.rankings.iter().enumerate() {
        println!("  {}. {} - {}", rank + 1, entry.name, entry.score);
    }

    let log = session.log();
    if !log.is_empty() {
        println!();
        println!("Last messages:");
        for entry in log.entries() {
            println!("  {}: {}", entry.player_name, entry.message);
        }
    }

    if let Some(path) = &config.events_path {
        println!();
        println!("Events written to {}", path.display());
    }

    Ok(())
}

fn show_rules() {
    println!("Units");
    println!("=====");
    println!("{:<10} {:>4} {:>4} {:>6} {:>5}", "unit", "cost", "hp", "attack", "move");
    for kind in UnitKind::ALL {
        let stats = kind.stats();
        println!(
            "{:<10} {:>4} {:>4} {:>6} {:>5}",
            kind.name(),
            stats.cost,
            stats.hp,
            stats.attack,
            stats.movement
        );
    }
    println!();
    println!("Behaviors");
    println!("=========");
    for behavior in Behavior::ALL {
        println!("{:<13} {}", behavior.name(), behavior.description());
    }
}

fn show_events(path: &Path, limit: usize) -> Result<()> {
    if !path.exists() {
        bail!("No event log at {}", path.display());
    }
    let sink = EventSink::new(path);
    for recorded in sink.read_recent(limit) {
        let event = serde_json::to_string(&recorded.event)?;
        println!(
            "[{}] round {}: {}",
            recorded.timestamp.format("%H:%M:%S"),
            recorded.round,
            event
        );
    }
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let yaml = serde_yaml::to_string(&MarchlandsConfig::default())
        .context("Failed to serialize default config")?;
    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    println!("Wrote {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Adjust players, grid size and oracle in {}", path.display());
    println!("  2. Run: marchlands play --config {}", path.display());
    Ok(())
}
