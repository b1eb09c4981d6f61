//! Navigation orchestrator.
//!
//! Decides, for each back or forward command, whether to navigate, open a
//! confirmation window, or carry out the confirmed close/reopen. The active
//! tab is resolved fresh on every command. Every gateway call is a suspension
//! point, and no lock is held across one, so a back and a forward command may
//! interleave; all pending state is keyed by tab id (plus the single reopen
//! slot) and the last write wins.

use std::sync::Arc;
use std::time::Duration;

use simple_navigator_config::{COMMAND_GO_BACK_OR_CLOSE, COMMAND_GO_FORWARD, Config};

use crate::activity_log::LogAction;
use crate::confirmation::ConfirmationStore;
use crate::gateway::{TabGateway, TabId};
use crate::status::StatusBroadcaster;
use crate::surfaces::SurfaceHub;

const CLOSE_TOAST: &str = "Press again to close this tab";
const REOPEN_TOAST: &str = "Press again to reopen the last closed tab";

/// The two host-level commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    GoBackOrClose,
    GoForward,
}

impl Command {
    /// Parse a command name as used in keybindings and host shortcuts.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            COMMAND_GO_BACK_OR_CLOSE => Some(Command::GoBackOrClose),
            COMMAND_GO_FORWARD => Some(Command::GoForward),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::GoBackOrClose => COMMAND_GO_BACK_OR_CLOSE,
            Command::GoForward => COMMAND_GO_FORWARD,
        }
    }
}

/// Behaviour switches taken from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationSettings {
    /// When false the back command never arms or confirms a close.
    pub enable_tab_close: bool,
    /// Toast the tab's content surface whenever a confirmation is armed.
    pub enable_toast: bool,
    pub toast_delay: Duration,
}

impl NavigationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            enable_tab_close: config.enable_tab_close,
            enable_toast: config.enable_toast,
            toast_delay: config.toast_delay(),
        }
    }
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// All mutable orchestrator state, built once at process start and shared
/// by the orchestrator and the message router.
#[derive(Debug)]
pub struct OrchestratorState {
    pub confirmations: ConfirmationStore,
    pub status: StatusBroadcaster,
    pub settings: NavigationSettings,
}

impl OrchestratorState {
    pub fn new(config: &Config, hub: Arc<SurfaceHub>) -> Self {
        Self {
            confirmations: ConfirmationStore::new(config.confirmation_timeout()),
            status: StatusBroadcaster::new(config.max_nav_logs, config.logging_enabled, hub),
            settings: NavigationSettings::from_config(config),
        }
    }

    pub fn hub(&self) -> &Arc<SurfaceHub> {
        self.status.hub()
    }
}

/// Result of one back or forward command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The window had no active tab; nothing happened.
    NoActiveTab,
    NavigatedBack(TabId),
    NavigatedForward(TabId),
    /// A close confirmation window was opened for the tab.
    CloseArmed(TabId),
    /// Back could not proceed but tab closing is switched off.
    CloseDisabled(TabId),
    /// The tab was closed; `returned_to` is the provenance source re-activated first.
    TabClosed {
        tab: TabId,
        returned_to: Option<TabId>,
    },
    /// A reopen confirmation window was opened for the tab.
    ReopenArmed(TabId),
    /// The reopen was confirmed from `source`; `reopened` is `None` when the
    /// host had nothing to restore.
    TabReopened {
        source: TabId,
        reopened: Option<TabId>,
    },
}

/// Why the back command fell through to the close path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackFailure {
    HistoryExhausted,
    NavigationFailed,
}

/// Back-or-close / forward-or-reopen state machine over a [`TabGateway`].
#[derive(Debug)]
pub struct NavigationOrchestrator<G> {
    gateway: Arc<G>,
    state: Arc<OrchestratorState>,
}

impl<G> Clone for NavigationOrchestrator<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            state: Arc::clone(&self.state),
        }
    }
}

impl<G: TabGateway> NavigationOrchestrator<G> {
    pub fn new(gateway: Arc<G>, state: Arc<OrchestratorState>) -> Self {
        Self { gateway, state }
    }

    pub fn state(&self) -> &Arc<OrchestratorState> {
        &self.state
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Run `command`; `label` names the trigger in the activity log.
    pub async fn run(&self, command: Command, label: &str) -> Outcome {
        match command {
            Command::GoBackOrClose => self.back(label).await,
            Command::GoForward => self.forward(label).await,
        }
    }

    /// Navigate back, or arm/confirm closing the active tab.
    pub async fn back(&self, label: &str) -> Outcome {
        let Some(tab) = self.resolve_active_tab().await else {
            return Outcome::NoActiveTab;
        };

        // A failed probe proves nothing about the history, so navigation is
        // still attempted below.
        let stack = match self.gateway.inspect_route_stack(tab).await {
            Ok(stack) => Some(stack),
            Err(e) => {
                log::warn!("Unable to read route stack for tab {}: {}", tab, e);
                None
            }
        };
        log::debug!("Route stack (back) for tab {}: {:?}", tab, stack);

        if stack.as_ref().is_some_and(|s| s.is_exhausted()) {
            return self.back_failed(tab, label, BackFailure::HistoryExhausted).await;
        }

        match self.gateway.go_back(tab).await {
            Ok(()) => {
                if self.state.confirmations.disarm_close(tab) {
                    self.hide_toast(tab);
                }
                self.state.status.append_log(
                    LogAction::Back,
                    format!("{label} → Browser back navigation executed"),
                );
                Outcome::NavigatedBack(tab)
            }
            Err(e) => {
                log::debug!("Back unavailable for tab {}: {}", tab, e);
                self.back_failed(tab, label, BackFailure::NavigationFailed).await
            }
        }
    }

    /// Navigate forward, or arm/confirm reopening the last closed tab.
    pub async fn forward(&self, label: &str) -> Outcome {
        let Some(tab) = self.resolve_active_tab().await else {
            return Outcome::NoActiveTab;
        };

        if let Err(e) = self.gateway.go_forward(tab).await {
            log::debug!("Forward unavailable for tab {}: {}", tab, e);
            return self.forward_failed(tab, label).await;
        }

        if let Some(armed_in) = self.state.confirmations.reopen_target() {
            self.state.confirmations.disarm_reopen();
            self.hide_toast(armed_in);
        }
        self.state.status.append_log(
            LogAction::Forward,
            format!("{label} → Browser forward navigation executed"),
        );
        Outcome::NavigatedForward(tab)
    }

    async fn back_failed(&self, tab: TabId, label: &str, reason: BackFailure) -> Outcome {
        let state = &self.state;
        if !state.settings.enable_tab_close {
            log::debug!(
                "Tab close disabled; ignoring {:?} on tab {}",
                reason,
                tab
            );
            return Outcome::CloseDisabled(tab);
        }

        if !state.confirmations.is_close_armed(tab) {
            log::info!("Awaiting confirmation to close tab {} ({:?})", tab, reason);
            state.confirmations.arm_close(tab);
            let detail = match reason {
                BackFailure::HistoryExhausted => "History empty, waiting for confirmation to close",
                BackFailure::NavigationFailed => {
                    "Unable to go back, waiting for confirmation to close"
                }
            };
            state
                .status
                .append_log(LogAction::AwaitClose, format!("{label} → {detail}"));
            self.toast(tab, CLOSE_TOAST);
            return Outcome::CloseArmed(tab);
        }

        log::info!("Confirmed close for tab {}", tab);
        state.confirmations.disarm_close(tab);
        self.hide_toast(tab);

        // The source tab must be active before this one goes away.
        let returned_to = match state.confirmations.take_provenance(tab) {
            Some(source) => self.activate(source).await.then_some(source),
            None => None,
        };
        if let Err(e) = self.gateway.close_tab(tab).await {
            log::warn!("Unable to close tab {}: {}", tab, e);
        }

        let detail = match reason {
            BackFailure::HistoryExhausted => "History exhausted, closing active tab",
            BackFailure::NavigationFailed => "Confirmed tab close",
        };
        state
            .status
            .append_log(LogAction::CloseTab, format!("{label} → {detail}"));
        Outcome::TabClosed { tab, returned_to }
    }

    async fn forward_failed(&self, tab: TabId, label: &str) -> Outcome {
        let state = &self.state;
        if !state.confirmations.is_reopen_armed(tab) {
            log::info!("Awaiting confirmation to reopen last closed tab (from tab {})", tab);
            state.confirmations.arm_reopen(tab);
            state.status.append_log(
                LogAction::AwaitReopen,
                format!("{label} → Unable to go forward, waiting for confirmation to reopen last tab"),
            );
            self.toast(tab, REOPEN_TOAST);
            return Outcome::ReopenArmed(tab);
        }

        log::info!("Confirmed reopen of last closed tab (from tab {})", tab);
        state.confirmations.disarm_reopen();
        self.hide_toast(tab);
        let reopened = match self.gateway.restore_last_closed().await {
            Ok(Some(reopened)) => {
                state.confirmations.record_provenance(reopened, tab);
                Some(reopened)
            }
            Ok(None) => {
                log::info!("Nothing to reopen");
                None
            }
            Err(e) => {
                log::warn!("Unable to restore last closed tab: {}", e);
                None
            }
        };
        state.status.append_log(
            LogAction::ReopenTab,
            format!("{label} → Reopened the most recently closed tab"),
        );
        Outcome::TabReopened {
            source: tab,
            reopened,
        }
    }

    async fn resolve_active_tab(&self) -> Option<TabId> {
        match self.gateway.active_tab().await {
            Ok(Some(info)) => Some(info.id),
            Ok(None) => {
                log::debug!("No active tab; command ignored");
                None
            }
            Err(e) => {
                log::debug!("Active tab query failed: {}", e);
                None
            }
        }
    }

    /// Bring `tab` to the front. Returns `false` if it no longer exists.
    async fn activate(&self, tab: TabId) -> bool {
        if let Err(e) = self.gateway.get_tab(tab).await {
            log::debug!("Provenance source {} is gone: {}", tab, e);
            return false;
        }
        match self.gateway.activate_tab(tab).await {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Unable to activate tab {}: {}", tab, e);
                false
            }
        }
    }

    fn toast(&self, tab: TabId, message: &str) {
        let settings = &self.state.settings;
        if settings.enable_toast {
            let duration_ms = u64::try_from(settings.toast_delay.as_millis()).ok();
            self.state.hub().toast(tab, message, duration_ms);
        }
    }

    fn hide_toast(&self, tab: TabId) {
        if self.state.settings.enable_toast {
            self.state.hub().hide_toast(tab);
        }
    }
}
