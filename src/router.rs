//! Messaging router.
//!
//! Entry point for everything that reaches the orchestrator from outside:
//! surface messages (JSON), host shortcut commands, content key presses, and
//! host tab-removal notifications.

use simple_navigator_keybindings::{KeyPress, KeybindingRegistry};

use crate::error::RouterError;
use crate::gateway::{TabGateway, TabId};
use crate::orchestrator::{Command, NavigationOrchestrator, OrchestratorState, Outcome};
use crate::protocol::{StatusResponse, SurfaceRequest};
use crate::simulated_host::HostEvent;

/// Trigger label for the host back shortcut.
pub const LABEL_SHORTCUT_BACK: &str = "Shortcut Back";
/// Trigger label for the host forward shortcut.
pub const LABEL_SHORTCUT_FORWARD: &str = "Shortcut Forward";
/// Trigger label for the content-surface back hotkey.
pub const LABEL_HOTKEY_BACK: &str = "Hotkey Back";
/// Trigger label for the content-surface forward hotkey.
pub const LABEL_HOTKEY_FORWARD: &str = "Hotkey Forward";

/// Dispatches inbound traffic to the orchestrator and status broadcaster.
#[derive(Debug)]
pub struct MessageRouter<G> {
    orchestrator: NavigationOrchestrator<G>,
    keybindings: KeybindingRegistry,
}

impl<G: TabGateway> MessageRouter<G> {
    pub fn new(orchestrator: NavigationOrchestrator<G>, keybindings: KeybindingRegistry) -> Self {
        Self {
            orchestrator,
            keybindings,
        }
    }

    pub fn orchestrator(&self) -> &NavigationOrchestrator<G> {
        &self.orchestrator
    }

    fn state(&self) -> &OrchestratorState {
        self.orchestrator.state()
    }

    /// Decode and handle a raw JSON surface message.
    ///
    /// Returns the serialized reply, or `None` when the message gets no reply
    /// (fire-and-forget requests, messages without a `type`, unknown types).
    /// An `Err` also means no reply is sent.
    pub async fn handle_message(&self, raw: &str) -> Result<Option<String>, RouterError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(RouterError::MalformedJson)?;

        let Some(message_type) = value.get("type").and_then(serde_json::Value::as_str) else {
            log::debug!("Ignoring surface message without a type");
            return Ok(None);
        };
        if !SurfaceRequest::is_known_type(message_type) {
            log::warn!("Unknown message type '{}'", message_type);
            return Ok(None);
        }

        let message_type = message_type.to_string();
        let request: SurfaceRequest =
            serde_json::from_value(value).map_err(|source| RouterError::InvalidPayload {
                message_type,
                source,
            })?;

        match self.handle_request(request).await {
            Some(response) => serde_json::to_string(&response)
                .map(Some)
                .map_err(RouterError::Encode),
            None => Ok(None),
        }
    }

    /// Handle a decoded surface request.
    pub async fn handle_request(&self, request: SurfaceRequest) -> Option<StatusResponse> {
        log::debug!("Surface request: {:?}", request);
        let status = &self.state().status;
        match request {
            SurfaceRequest::Ping => Some(StatusResponse::ok(status.snapshot())),
            SurfaceRequest::ClearLogs => Some(StatusResponse::ok(status.clear())),
            SurfaceRequest::SetLogging { payload } => {
                Some(StatusResponse::ok(status.set_logging_enabled(payload.enabled)))
            }
            SurfaceRequest::HotkeyBack => {
                self.orchestrator.back(LABEL_HOTKEY_BACK).await;
                None
            }
            SurfaceRequest::HotkeyForward => {
                self.orchestrator.forward(LABEL_HOTKEY_FORWARD).await;
                None
            }
            SurfaceRequest::KeyPress { payload } => {
                self.handle_key(&payload).await;
                None
            }
        }
    }

    /// Run a host shortcut command by name. Unknown names are ignored.
    pub async fn dispatch_command(&self, name: &str) -> Option<Outcome> {
        let Some(command) = Command::from_name(name) else {
            log::warn!("Unknown command '{}'", name);
            return None;
        };
        let label = match command {
            Command::GoBackOrClose => LABEL_SHORTCUT_BACK,
            Command::GoForward => LABEL_SHORTCUT_FORWARD,
        };
        Some(self.orchestrator.run(command, label).await)
    }

    /// Run the command bound to a content-surface key press, if any.
    pub async fn handle_key(&self, press: &KeyPress) -> Option<Outcome> {
        let action = self.keybindings.lookup(press)?;
        let Some(command) = Command::from_name(action) else {
            log::warn!("Key '{}' is bound to unknown command '{}'", press.key, action);
            return None;
        };
        log::info!("Detected {} hotkey ({})", command.name(), press.key);
        let label = match command {
            Command::GoBackOrClose => LABEL_HOTKEY_BACK,
            Command::GoForward => LABEL_HOTKEY_FORWARD,
        };
        Some(self.orchestrator.run(command, label).await)
    }

    /// Host notification that `tab` is gone, however it was closed.
    pub fn on_tab_removed(&self, tab: TabId) {
        log::debug!("Tab {} removed", tab);
        self.state().confirmations.on_tab_closed(tab);
        self.state().hub().detach_tab(tab);
    }

    pub fn on_host_event(&self, event: HostEvent) {
        match event {
            HostEvent::TabRemoved(tab) => self.on_tab_removed(tab),
        }
    }
}
