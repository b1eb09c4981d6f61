//! Key event matching.
//!
//! Matches key presses reported by content surfaces against parsed KeyCombos.
//! Supports both logical key matching (character-based) and physical key
//! matching (`KeyboardEvent.code`-based) for layout-independent bindings.

use serde::{Deserialize, Serialize};

use super::parser::{KeyCombo, Modifiers, NamedKey, ParsedKey, parse_named_key};
use super::platform::resolve_cmd_or_ctrl;

/// A key press as reported by a content surface, mirroring the fields of a
/// DOM `KeyboardEvent`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPress {
    /// Logical key value, e.g. "[" or "ArrowLeft".
    pub key: String,
    /// Physical key code, e.g. "BracketLeft".
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub alt_key: bool,
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub shift_key: bool,
    #[serde(default)]
    pub meta_key: bool,
    /// Auto-repeat from a held key.
    #[serde(default)]
    pub repeat: bool,
}

/// Matcher for comparing key presses against keybindings.
#[derive(Debug)]
pub struct KeybindingMatcher {
    /// Active modifiers from the event
    modifiers: Modifiers,
    /// The logical key from the event
    key: Option<MatchKey>,
    /// The physical key code from the event
    physical_key: Option<String>,
}

/// Normalized key for matching purposes.
#[derive(Debug)]
enum MatchKey {
    Character(char),
    Named(NamedKey),
}

impl KeybindingMatcher {
    /// Create a matcher from a key press.
    pub fn from_press(press: &KeyPress) -> Self {
        let modifiers = Modifiers {
            ctrl: press.ctrl_key,
            alt: press.alt_key,
            shift: press.shift_key,
            super_key: press.meta_key,
            cmd_or_ctrl: false, // Resolved during matching
        };

        let key = if let Some(named) = parse_named_key(&press.key) {
            Some(MatchKey::Named(named))
        } else {
            let mut chars = press.key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(MatchKey::Character(c.to_ascii_uppercase())),
                _ => None,
            }
        };

        Self {
            modifiers,
            key,
            physical_key: press.code.clone(),
        }
    }

    /// Check if this press matches the given key combo.
    pub fn matches(&self, combo: &KeyCombo) -> bool {
        let (expected_ctrl, expected_super) = resolve_cmd_or_ctrl(
            combo.modifiers.cmd_or_ctrl,
            combo.modifiers.ctrl,
            combo.modifiers.super_key,
        );

        if self.modifiers.ctrl != expected_ctrl
            || self.modifiers.alt != combo.modifiers.alt
            || self.modifiers.shift != combo.modifiers.shift
            || self.modifiers.super_key != expected_super
        {
            return false;
        }

        match (&combo.key, &self.key) {
            (ParsedKey::Character(expected), Some(MatchKey::Character(actual))) => {
                expected == actual
            }
            (ParsedKey::Named(expected), Some(MatchKey::Named(actual))) => expected == actual,
            (ParsedKey::Physical(expected), _) => self
                .physical_key
                .as_deref()
                .is_some_and(|code| code.eq_ignore_ascii_case(expected)),
            _ => false,
        }
    }
}
