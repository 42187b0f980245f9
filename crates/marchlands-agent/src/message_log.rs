use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marchlands_protocol::PlayerId;

pub const MESSAGE_LOG_CAPACITY: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub player: PlayerId,
    pub player_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Player-facing chat log: intentions, courtesy notes, refusals, diplomacy.
/// Keeps only the most recent entries.
#[derive(Debug, Clone)]
pub struct MessageLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::with_capacity(MESSAGE_LOG_CAPACITY)
    }
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, player: PlayerId, player_name: &str, message: impl Into<String>) {
        let entry = LogEntry {
            player,
            player_name: player_name.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
        };
        tracing::info!(player = %player, name = %entry.player_name, "{}", entry.message);
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
