//! JSON messages exchanged between the orchestrator and its surfaces.
//!
//! Inbound [`SurfaceRequest`]s and outbound [`SurfaceEvent`]s are objects
//! tagged with `type`; arguments live under `payload`. Requests answered with
//! a status reply get a [`StatusResponse`].

use serde::{Deserialize, Serialize};
use simple_navigator_keybindings::KeyPress;

use crate::status::StatusSnapshot;

/// Every `type` value a [`SurfaceRequest`] accepts, aliases included.
pub const REQUEST_TYPES: &[&str] = &[
    "ping",
    "content:ping",
    "clearLogs",
    "popup:clearLogs",
    "setLogging",
    "popup:setLogging",
    "hotkey:back",
    "hotkey:forward",
    "keyPress",
    "content:keydown",
];

/// A request sent from a surface to the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SurfaceRequest {
    /// Ask for the current status.
    #[serde(rename = "ping", alias = "content:ping")]
    Ping,

    /// Empty the activity log.
    #[serde(rename = "clearLogs", alias = "popup:clearLogs")]
    ClearLogs,

    /// Turn activity logging on or off.
    #[serde(rename = "setLogging", alias = "popup:setLogging")]
    SetLogging { payload: SetLoggingPayload },

    /// A content script saw the back hotkey.
    #[serde(rename = "hotkey:back")]
    HotkeyBack,

    /// A content script saw the forward hotkey.
    #[serde(rename = "hotkey:forward")]
    HotkeyForward,

    /// A raw key press from a content script, resolved against the
    /// configured keybindings.
    #[serde(rename = "keyPress", alias = "content:keydown")]
    KeyPress { payload: KeyPress },
}

impl SurfaceRequest {
    /// Whether `message_type` names a known request.
    pub fn is_known_type(message_type: &str) -> bool {
        REQUEST_TYPES.contains(&message_type)
    }

}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetLoggingPayload {
    pub enabled: bool,
}

/// Reply to `ping`, `clearLogs` and `setLogging`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub status: StatusSnapshot,
}

impl StatusResponse {
    pub fn ok(status: StatusSnapshot) -> Self {
        Self { ok: true, status }
    }
}

/// An event pushed from the orchestrator to surfaces.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SurfaceEvent {
    /// Current status, sent to every surface after each change.
    #[serde(rename = "status", alias = "background:status")]
    Status { payload: StatusSnapshot },

    /// Transient message for the content surface of one tab.
    #[serde(rename = "toast", alias = "ui:toast")]
    Toast { payload: ToastPayload },

    /// Dismiss the tab's toast; its confirmation was consumed or cancelled.
    #[serde(rename = "hideToast", alias = "background:hideConfirm")]
    HideToast,
}

impl SurfaceEvent {
    /// Wire `type` of the event.
    pub fn kind(&self) -> &'static str {
        match self {
            SurfaceEvent::Status { .. } => "status",
            SurfaceEvent::Toast { .. } => "toast",
            SurfaceEvent::HideToast => "hideToast",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastPayload {
    pub message: String,
    /// How long the toast should stay visible; the surface picks when absent.
    #[serde(rename = "durationMs", default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}
