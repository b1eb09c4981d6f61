//! Shared integration test helpers for simple-navigator.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::Harness;
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a subset
//! of helpers is used per file.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use simple_navigator::{
    HostEvent, LogAction, MessageRouter, NavigationOrchestrator, OrchestratorState,
    SimulatedBrowser, StatusSnapshot, SurfaceEvent, SurfaceHub, SurfaceKind, TabId,
};
use simple_navigator_config::Config;
use simple_navigator_keybindings::KeybindingRegistry;
use tokio::sync::mpsc;

/// Simulated browser + router with a popup surface attached.
pub struct Harness {
    pub browser: Arc<SimulatedBrowser>,
    pub router: MessageRouter<SimulatedBrowser>,
    pub host_events: mpsc::UnboundedReceiver<HostEvent>,
    pub popup: mpsc::UnboundedReceiver<SurfaceEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let (host_tx, host_events) = mpsc::unbounded_channel();
        let browser = Arc::new(SimulatedBrowser::with_events(host_tx));

        let hub = Arc::new(SurfaceHub::new());
        let (popup_tx, popup) = mpsc::unbounded_channel();
        hub.attach(SurfaceKind::Popup, popup_tx);

        let state = Arc::new(OrchestratorState::new(&config, hub));
        let orchestrator = NavigationOrchestrator::new(Arc::clone(&browser), state);
        let router = MessageRouter::new(
            orchestrator,
            KeybindingRegistry::from_config(&config.keybindings),
        );

        Self {
            browser,
            router,
            host_events,
            popup,
        }
    }

    pub fn state(&self) -> &OrchestratorState {
        self.router.orchestrator().state()
    }

    /// Open a tab whose history holds `urls`, positioned on the last one.
    pub fn open_with_history(&self, urls: &[&str]) -> TabId {
        let tab = self.browser.open_tab(urls[0]);
        for url in &urls[1..] {
            self.browser.visit(tab, url).unwrap();
        }
        tab
    }

    /// Attach a content surface for `tab`.
    pub fn attach_content(&self, tab: TabId) -> mpsc::UnboundedReceiver<SurfaceEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state().hub().attach(SurfaceKind::Content(tab), tx);
        rx
    }

    /// Forward pending host notifications to the router.
    pub fn pump_host_events(&mut self) {
        while let Ok(event) = self.host_events.try_recv() {
            self.router.on_host_event(event);
        }
    }

    /// Activity log actions, newest first.
    pub fn log_actions(&self) -> Vec<LogAction> {
        self.state()
            .status
            .snapshot()
            .navigation_logs
            .iter()
            .map(|entry| entry.action)
            .collect()
    }

    /// Status payloads the popup received so far.
    pub fn drain_popup(&mut self) -> Vec<StatusSnapshot> {
        let mut statuses = Vec::new();
        while let Ok(event) = self.popup.try_recv() {
            if let SurfaceEvent::Status { payload } = event {
                statuses.push(payload);
            }
        }
        statuses
    }
}

/// Move paused tokio time forward.
pub async fn advance_ms(ms: u64) {
    tokio::time::advance(Duration::from_millis(ms)).await;
    tokio::task::yield_now().await;
}
