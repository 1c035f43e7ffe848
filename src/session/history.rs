use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// Number of command records kept per session
pub const HISTORY_CAPACITY: usize = 100;

/// A command observed in a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    pub command: String,
    pub cwd: String,
    pub timestamp: DateTime<Utc>,
    pub exit_code: i32,
}

/// Fixed-size ring of recent commands
///
/// Once full, each push reuses the slot of the oldest record.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    records: VecDeque<CommandRecord>,
    capacity: usize,
}

impl CommandHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, record: CommandRecord) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &CommandRecord> {
        self.records.iter()
    }

    pub fn latest(&self) -> Option<&CommandRecord> {
        self.records.back()
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}
