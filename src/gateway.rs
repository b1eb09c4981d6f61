//! Tab & history gateway.
//!
//! The orchestrator never talks to a browser directly; it goes through
//! [`TabGateway`], an async boundary over the handful of host operations it
//! needs. Implementations hold no orchestrator state. Each call is a
//! suspension point, and every failure comes back as a [`HostError`] value.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// Opaque identifier of a browser tab, stable for the tab's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of an in-tab history navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavDirection {
    Back,
    Forward,
}

impl fmt::Display for NavDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavDirection::Back => write!(f, "back"),
            NavDirection::Forward => write!(f, "forward"),
        }
    }
}

/// Snapshot of a tab's in-page history, as read by the page probe.
///
/// `length` counts every session-history entry of the tab, including entries
/// ahead of the current one, so `length > 1` does not guarantee that back
/// navigation is possible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStack {
    pub length: usize,
    pub state: Option<serde_json::Value>,
    pub url: String,
}

impl RouteStack {
    /// True when the history holds at most the current entry.
    pub fn is_exhausted(&self) -> bool {
        self.length <= 1
    }
}

/// Host-side description of an open tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: TabId,
    pub url: String,
    pub active: bool,
}

/// Host operations consumed by the navigation orchestrator.
///
/// The active tab is always "the active tab of the current window".
pub trait TabGateway: Send + Sync {
    /// Query the active tab. `Ok(None)` when the window has no active tab.
    fn active_tab(&self) -> impl Future<Output = Result<Option<TabInfo>, HostError>> + Send;

    /// Look up a tab by id.
    fn get_tab(&self, tab: TabId) -> impl Future<Output = Result<TabInfo, HostError>> + Send;

    /// Make `tab` the active tab.
    fn activate_tab(&self, tab: TabId) -> impl Future<Output = Result<(), HostError>> + Send;

    /// Close `tab`. The host reports the removal through its tab-removal
    /// notification as well.
    fn close_tab(&self, tab: TabId) -> impl Future<Output = Result<(), HostError>> + Send;

    /// Navigate `tab` one entry back in its history.
    fn go_back(&self, tab: TabId) -> impl Future<Output = Result<(), HostError>> + Send;

    /// Navigate `tab` one entry forward in its history.
    fn go_forward(&self, tab: TabId) -> impl Future<Output = Result<(), HostError>> + Send;

    /// Restore the most recently closed tab. `Ok(None)` when there is nothing
    /// to restore or the restored session is not a tab.
    fn restore_last_closed(&self) -> impl Future<Output = Result<Option<TabId>, HostError>> + Send;

    /// Read the tab's route stack by probing its page.
    fn inspect_route_stack(
        &self,
        tab: TabId,
    ) -> impl Future<Output = Result<RouteStack, HostError>> + Send;
}
