//! Extension-wide status: the activity log, the logging switch, and the
//! broadcast of both to every attached surface.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::activity_log::{ActivityLog, LogAction, LogEntry};
use crate::protocol::SurfaceEvent;
use crate::surfaces::SurfaceHub;

/// Process-lifetime state shown to surfaces.
#[derive(Debug, Clone)]
pub struct ExtensionState {
    pub navigation_logs: ActivityLog,
    pub logging_enabled: bool,
}

/// Serializable view of [`ExtensionState`] sent to surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub logging_enabled: bool,
    pub navigation_logs: Vec<LogEntry>,
}

/// Owns [`ExtensionState`] and pushes a status event after every change.
#[derive(Debug)]
pub struct StatusBroadcaster {
    state: Mutex<ExtensionState>,
    hub: Arc<SurfaceHub>,
}

impl StatusBroadcaster {
    pub fn new(log_capacity: usize, logging_enabled: bool, hub: Arc<SurfaceHub>) -> Self {
        Self {
            state: Mutex::new(ExtensionState {
                navigation_logs: ActivityLog::new(log_capacity),
                logging_enabled,
            }),
            hub,
        }
    }

    /// Surfaces that receive the broadcasts.
    pub fn hub(&self) -> &Arc<SurfaceHub> {
        &self.hub
    }

    /// Record a decision and broadcast. Returns `false` without broadcasting
    /// when logging is disabled.
    pub fn append_log(&self, action: LogAction, detail: impl Into<String>) -> bool {
        let snapshot = {
            let mut state = self.state.lock();
            if !state.logging_enabled {
                return false;
            }
            let entry = state.navigation_logs.push(action, detail);
            log::info!("[activity] {}: {}", entry.action, entry.detail);
            snapshot_of(&state)
        };
        self.broadcast(snapshot);
        true
    }

    /// Empty the activity log and broadcast.
    pub fn clear(&self) -> StatusSnapshot {
        let snapshot = {
            let mut state = self.state.lock();
            state.navigation_logs.clear();
            snapshot_of(&state)
        };
        self.broadcast(snapshot.clone());
        snapshot
    }

    /// Turn activity logging on or off and broadcast.
    pub fn set_logging_enabled(&self, enabled: bool) -> StatusSnapshot {
        let snapshot = {
            let mut state = self.state.lock();
            state.logging_enabled = enabled;
            snapshot_of(&state)
        };
        log::info!(
            "Activity logging {}",
            if enabled { "enabled" } else { "disabled" }
        );
        self.broadcast(snapshot.clone());
        snapshot
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        snapshot_of(&self.state.lock())
    }

    pub fn logging_enabled(&self) -> bool {
        self.state.lock().logging_enabled
    }

    fn broadcast(&self, snapshot: StatusSnapshot) {
        self.hub.broadcast(&SurfaceEvent::Status { payload: snapshot });
    }
}

fn snapshot_of(state: &ExtensionState) -> StatusSnapshot {
    StatusSnapshot {
        logging_enabled: state.logging_enabled,
        navigation_logs: state.navigation_logs.to_vec(),
    }
}
