//! The `Config` struct and its in-memory helpers.
//!
//! File I/O and path resolution live in `persistence.rs`.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{KeyBinding, LogLevel};

/// Largest activity log a config may ask for.
pub const MAX_NAV_LOGS_LIMIT: usize = 1000;

/// User-facing settings for the navigation-confirmation orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// How long a pending close/reopen confirmation stays armed, in milliseconds.
    #[serde(default = "crate::defaults::confirmation_timeout_ms")]
    pub confirmation_timeout_ms: u64,

    /// Maximum number of entries kept in the activity log (newest first).
    #[serde(default = "crate::defaults::max_nav_logs")]
    pub max_nav_logs: usize,

    /// Whether activity logging starts enabled for a new process.
    #[serde(default = "crate::defaults::bool_true")]
    pub logging_enabled: bool,

    /// Allow the back shortcut to arm and confirm closing the active tab.
    #[serde(default = "crate::defaults::bool_true")]
    pub enable_tab_close: bool,

    /// Send a toast to the tab's content surface when a confirmation is armed.
    #[serde(default = "crate::defaults::bool_true")]
    pub enable_toast: bool,

    /// How long content surfaces should keep a confirmation toast visible.
    #[serde(default = "crate::defaults::toast_delay_ms")]
    pub toast_delay_ms: u64,

    /// Verbosity of the debug log file.
    #[serde(default = "crate::defaults::log_level")]
    pub log_level: LogLevel,

    /// Content-surface hotkeys mapped to command names.
    #[serde(default = "crate::defaults::keybindings")]
    pub keybindings: Vec<KeyBinding>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            confirmation_timeout_ms: crate::defaults::confirmation_timeout_ms(),
            max_nav_logs: crate::defaults::max_nav_logs(),
            logging_enabled: true,
            enable_tab_close: true,
            enable_toast: true,
            toast_delay_ms: crate::defaults::toast_delay_ms(),
            log_level: crate::defaults::log_level(),
            keybindings: crate::defaults::keybindings(),
        }
    }
}

impl Config {
    /// Confirmation window as a `Duration`.
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }

    /// Toast display time as a `Duration`.
    pub fn toast_delay(&self) -> Duration {
        Duration::from_millis(self.toast_delay_ms)
    }

    /// Check field values that serde alone cannot enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.confirmation_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "confirmation_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_nav_logs == 0 {
            return Err(ConfigError::Validation(
                "max_nav_logs must be at least 1".to_string(),
            ));
        }
        if self.max_nav_logs > MAX_NAV_LOGS_LIMIT {
            return Err(ConfigError::Validation(format!(
                "max_nav_logs ({}) must not exceed {}",
                self.max_nav_logs, MAX_NAV_LOGS_LIMIT
            )));
        }
        if self.toast_delay_ms > self.confirmation_timeout_ms {
            return Err(ConfigError::Validation(format!(
                "toast_delay_ms ({}) must not exceed confirmation_timeout_ms ({})",
                self.toast_delay_ms, self.confirmation_timeout_ms
            )));
        }
        Ok(())
    }

    /// Add default keybindings whose command is not bound in the user's config.
    pub(crate) fn merge_default_keybindings(&mut self) {
        let existing_actions: HashSet<String> = self
            .keybindings
            .iter()
            .map(|kb| kb.action.clone())
            .collect();

        let mut added_count = 0;
        for default_kb in crate::defaults::keybindings() {
            if !existing_actions.contains(&default_kb.action) {
                log::info!(
                    "Adding new default keybinding: {} -> {}",
                    default_kb.key,
                    default_kb.action
                );
                self.keybindings.push(default_kb);
                added_count += 1;
            }
        }

        if added_count > 0 {
            log::info!("Merged {} default keybinding(s) into user config", added_count);
        }
    }
}
