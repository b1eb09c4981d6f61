//! Keybinding system for simple-navigator.
//!
//! Content surfaces forward raw key presses; this crate decides which of them
//! are navigation hotkeys. Bindings are configurable in config.yaml.
//!
//! Features:
//! - Configurable key combinations (Alt+[, CmdOrCtrl+Shift+Left, etc.)
//! - Physical key support for layout-independent bindings
//! - Auto-repeat presses never trigger a binding

mod matcher;
pub mod parser;
mod platform;

pub use matcher::{KeyPress, KeybindingMatcher};
pub use parser::{KeyCombo, ParseError, parse_key_combo};

use simple_navigator_config::KeyBinding;

/// Registry of keybindings mapping key combinations to command names.
///
/// Bindings keep their config order; the first match wins.
#[derive(Debug, Default)]
pub struct KeybindingRegistry {
    bindings: Vec<(KeyCombo, String)>,
}

impl KeybindingRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from config keybindings.
    ///
    /// Invalid keybinding strings are logged and skipped.
    pub fn from_config(keybindings: &[KeyBinding]) -> Self {
        let mut registry = Self::new();

        log::info!(
            "Building keybinding registry from {} config keybindings",
            keybindings.len()
        );
        for binding in keybindings {
            match parser::parse_key_combo(&binding.key) {
                Ok(combo) => {
                    log::info!(
                        "Registered keybinding: {} -> {} (parsed as: {})",
                        binding.key,
                        binding.action,
                        combo
                    );
                    registry.bindings.push((combo, binding.action.clone()));
                }
                Err(e) => {
                    log::warn!(
                        "Invalid keybinding '{}' for action '{}': {}",
                        binding.key,
                        binding.action,
                        e
                    );
                }
            }
        }

        log::info!(
            "Keybinding registry initialized with {} bindings",
            registry.bindings.len()
        );
        registry
    }

    /// Look up the command bound to a key press.
    pub fn lookup(&self, press: &KeyPress) -> Option<&str> {
        if press.repeat {
            return None;
        }

        let matcher = KeybindingMatcher::from_press(press);
        self.bindings
            .iter()
            .find(|(combo, _)| matcher.matches(combo))
            .map(|(_, action)| action.as_str())
    }

    /// Check if the registry has any bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Get the number of registered bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}
