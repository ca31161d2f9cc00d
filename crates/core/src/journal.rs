//! Bounded history of executed commands.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One executed command and how it ended.
#[derive(Debug, Clone, Serialize)]
pub struct JournalEntry {
    /// When the command finished.
    pub at: DateTime<Utc>,
    /// Canonical text of the command.
    pub command: String,
    /// Result summary or error message.
    pub outcome: String,
    /// Whether the command succeeded.
    pub ok: bool,
}

/// Ring buffer of the most recent commands; oldest entries drop first.
#[derive(Debug, Clone)]
pub struct Journal {
    entries: VecDeque<JournalEntry>,
    capacity: usize,
}

impl Journal {
    /// Create a journal keeping at most `capacity` entries (minimum one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record an entry stamped with the current time.
    pub fn record(&mut self, command: impl Into<String>, outcome: impl Into<String>, ok: bool) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(JournalEntry {
            at: Utc::now(),
            command: command.into(),
            outcome: outcome.into(),
            ok,
        });
    }

    /// Entries from oldest to newest.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &JournalEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<&JournalEntry> {
        self.entries.back()
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of failed commands still held.
    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.ok).count()
    }
}
