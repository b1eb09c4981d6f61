//! Configuration system for simple-navigator.
//!
//! This crate provides configuration loading, saving, and default values
//! for the navigation-confirmation orchestrator. It includes:
//!
//! - Confirmation window and activity log settings
//! - Toast feedback settings
//! - Hotkey bindings for content surfaces
//! - Log level selection

pub mod config;
pub mod defaults;
pub mod error;
mod persistence;
mod types;

pub use config::{Config, MAX_NAV_LOGS_LIMIT};
pub use error::ConfigError;
pub use types::{KeyBinding, LogLevel};

/// Command name bound to the back-or-close shortcut.
pub const COMMAND_GO_BACK_OR_CLOSE: &str = "go-back-or-close";

/// Command name bound to the forward-or-reopen shortcut.
pub const COMMAND_GO_FORWARD: &str = "go-forward";
