//! Thread-safe handle to a [`Console`].
//!
//! The engine itself assumes a single caller. Hosts that drive it from more
//! than one task share it through this handle, which holds one exclusive
//! lock for the duration of each command.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    command::{Command, CommandError},
    console::{Console, Outcome},
    error::StationError,
    journal::JournalEntry,
    snapshot::StationSnapshot,
};

/// Cloneable, lock-guarded console.
#[derive(Debug, Clone)]
pub struct SharedConsole {
    inner: Arc<Mutex<Console>>,
}

impl SharedConsole {
    /// Wrap a console for shared use.
    pub fn new(console: Console) -> Self {
        Self {
            inner: Arc::new(Mutex::new(console)),
        }
    }

    /// Execute one parsed command.
    pub fn execute(&self, command: &Command) -> Result<Outcome, StationError> {
        self.inner.lock().execute(command)
    }

    /// Parse and execute one line.
    pub fn execute_line(&self, line: &str) -> Result<Option<Outcome>, CommandError> {
        self.inner.lock().execute_line(line)
    }

    /// Snapshot of the open station, if any.
    pub fn snapshot(&self) -> Option<StationSnapshot> {
        self.inner.lock().snapshot()
    }

    /// The `limit` most recent journal entries, newest last.
    pub fn recent(&self, limit: usize) -> Vec<JournalEntry> {
        let console = self.inner.lock();
        let journal = console.journal();
        let skip = journal.len().saturating_sub(limit);
        journal.entries().skip(skip).cloned().collect()
    }

    /// Run `f` with exclusive access to the console.
    pub fn with<R>(&self, f: impl FnOnce(&mut Console) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
