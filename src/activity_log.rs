//! Bounded, newest-first log of orchestrator decisions.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Entry ids stay unique across a session; the counter wraps at the largest
/// integer a JSON consumer can represent exactly.
const MAX_SAFE_COUNTER: u64 = (1 << 53) - 1;

/// Decision recorded by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogAction {
    Back,
    Forward,
    AwaitClose,
    CloseTab,
    AwaitReopen,
    ReopenTab,
}

impl LogAction {
    /// Wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::Back => "back",
            LogAction::Forward => "forward",
            LogAction::AwaitClose => "await_close",
            LogAction::CloseTab => "close_tab",
            LogAction::AwaitReopen => "await_reopen",
            LogAction::ReopenTab => "reopen_tab",
        }
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// `"<millis>-<counter>"`
    pub id: String,
    pub action: LogAction,
    pub detail: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Capacity-bounded activity log. Index 0 is the newest entry.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    counter: u64,
}

impl ActivityLog {
    /// Create an empty log holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::new(),
            capacity,
            counter: 0,
        }
    }

    /// Record a decision, evicting the oldest entry when full.
    pub fn push(&mut self, action: LogAction, detail: impl Into<String>) -> &LogEntry {
        let now = chrono::Utc::now().timestamp_millis();
        self.counter = (self.counter + 1) % MAX_SAFE_COUNTER;

        self.entries.push_front(LogEntry {
            id: format!("{}-{}", now, self.counter),
            action,
            detail: detail.into(),
            timestamp: now,
        });
        self.entries.truncate(self.capacity);
        &self.entries[0]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Owned copy of the entries, newest first.
    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
