//! Typed error types for simple-navigator.
//!
//! `HostError` is what the tab gateway reports when the host refuses or cannot
//! perform an operation. The orchestrator treats every `HostError` as a normal
//! negative outcome, never as something to show the user. `RouterError` covers
//! inbound surface messages that cannot be decoded.

use thiserror::Error;

use crate::gateway::{NavDirection, TabId};

/// Failure reported by a host tab/history operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The tab id does not refer to an open tab (closed, or never existed).
    #[error("no tab with id {0}")]
    TabNotFound(TabId),

    /// The tab has no history entry in the requested direction.
    #[error("{direction} navigation unavailable for tab {tab}")]
    NavigationUnavailable {
        /// Tab the navigation was attempted on.
        tab: TabId,
        /// Requested direction.
        direction: NavDirection,
    },

    /// The host refused to run the history probe in the tab's page
    /// (privileged or internal pages).
    #[error("script injection blocked for tab {tab} ({url})")]
    InjectionBlocked {
        /// Tab the probe targeted.
        tab: TabId,
        /// URL of the page that refused the probe.
        url: String,
    },

    /// The host is not reachable or returned an unexpected failure.
    #[error("host operation failed: {0}")]
    Unavailable(String),
}

/// Failure decoding an inbound surface message.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The message was not valid JSON.
    #[error("malformed surface message: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// The message had a known `type` but its payload did not match.
    #[error("invalid payload for '{message_type}': {source}")]
    InvalidPayload {
        /// The `type` field of the rejected message.
        message_type: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// A reply could not be serialized.
    #[error("failed to encode reply: {0}")]
    Encode(#[source] serde_json::Error),
}
