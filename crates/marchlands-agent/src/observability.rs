//! Observability - append-only JSONL record of game events.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marchlands_protocol::Event;

/// One event as written to the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub timestamp: DateTime<Utc>,
    pub round: u32,
    pub event: Event,
}

/// Appends every event it is given to a JSONL file.
pub struct EventSink {
    path: PathBuf,
}

impl EventSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `events`, all stamped with the same time and round.
    pub fn emit_all(&self, round: u32, events: &[Event]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open event log {}", self.path.display()))?;

        let timestamp = Utc::now();
        for event in events {
            let line = serde_json::to_string(&RecordedEvent {
                timestamp,
                round,
                event: event.clone(),
            })?;
            writeln!(file, "{}", line)?;
        }

        Ok(())
    }

    /// Read back the last `limit` events; unreadable lines are skipped.
    pub fn read_recent(&self, limit: usize) -> Vec<RecordedEvent> {
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(_) => return Vec::new(),
        };

        let reader = BufReader::new(file);
        let mut events: Vec<RecordedEvent> = reader
            .lines()
            .filter_map(|line| line.ok())
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect();

        if events.len() > limit {
            events.drain(0..events.len() - limit);
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use marchlands_protocol::PlayerId;

    use super::*;

    #[test]
    fn events_round_trip_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = EventSink::new(dir.path().join("logs/events.jsonl"));
        assert!(sink.read_recent(10).is_empty());

        sink.emit_all(
            1,
            &[
                Event::TurnEnded {
                    round: 1,
                    player: PlayerId(0),
                },
                Event::TurnStarted {
                    round: 1,
                    player: PlayerId(1),
                },
            ],
        )
        .unwrap();
        sink.emit_all(2, &[Event::RoundStarted { round: 2 }]).unwrap();

        let recent = sink.read_recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[1].event, Event::RoundStarted { round: 2 });
        assert_eq!(recent[1].round, 2);
    }
}
