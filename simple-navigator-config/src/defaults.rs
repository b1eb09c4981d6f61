//! Default value functions for configuration.
//!
//! Each function is used as a `#[serde(default = "crate::defaults::...")]`
//! attribute on a `Config` field.

use crate::types::{KeyBinding, LogLevel};

// ── Primitive helpers ──────────────────────────────────────────────────────

pub fn bool_true() -> bool {
    true
}

// ── Confirmation windows ───────────────────────────────────────────────────

pub fn confirmation_timeout_ms() -> u64 {
    4000
}

// ── Activity log ───────────────────────────────────────────────────────────

pub fn max_nav_logs() -> usize {
    20
}

pub fn log_level() -> LogLevel {
    LogLevel::Info
}

// ── Toast feedback ─────────────────────────────────────────────────────────

pub fn toast_delay_ms() -> u64 {
    1000
}

// ── Keybindings ────────────────────────────────────────────────────────────

pub fn keybindings() -> Vec<KeyBinding> {
    vec![
        KeyBinding {
            key: "Alt+[".to_string(),
            action: crate::COMMAND_GO_BACK_OR_CLOSE.to_string(),
        },
        KeyBinding {
            key: "Alt+]".to_string(),
            action: crate::COMMAND_GO_FORWARD.to_string(),
        },
    ]
}
