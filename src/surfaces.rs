//! Attached surfaces (popup, options page, per-tab content scripts) and
//! outbound event delivery.
//!
//! Delivery is fire-and-forget. A surface whose receiver has gone away is
//! pruned on the next send; having nobody to deliver to is only worth a
//! debug line.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::gateway::TabId;
use crate::protocol::{SurfaceEvent, ToastPayload};

/// What kind of UI context a surface is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    Popup,
    Options,
    /// Content script running in a tab's page.
    Content(TabId),
}

/// Handle returned by [`SurfaceHub::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(u64);

#[derive(Debug)]
struct Surface {
    id: SurfaceId,
    kind: SurfaceKind,
    tx: mpsc::UnboundedSender<SurfaceEvent>,
}

/// Registry of surfaces listening for status and toast events.
#[derive(Debug, Default)]
pub struct SurfaceHub {
    surfaces: Mutex<Vec<Surface>>,
    next_id: AtomicU64,
}

impl SurfaceHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a surface; events for it arrive on `tx`.
    pub fn attach(&self, kind: SurfaceKind, tx: mpsc::UnboundedSender<SurfaceEvent>) -> SurfaceId {
        let id = SurfaceId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.surfaces.lock().push(Surface { id, kind, tx });
        log::debug!("Surface {:?} attached as {:?}", kind, id);
        id
    }

    pub fn detach(&self, id: SurfaceId) {
        self.surfaces.lock().retain(|s| s.id != id);
    }

    /// Forget the content surfaces of a tab that no longer exists.
    pub fn detach_tab(&self, tab: TabId) {
        self.surfaces
            .lock()
            .retain(|s| s.kind != SurfaceKind::Content(tab));
    }

    pub fn len(&self) -> usize {
        self.surfaces.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.lock().is_empty()
    }

    /// Send `event` to every surface. Returns how many received it.
    pub fn broadcast(&self, event: &SurfaceEvent) -> usize {
        let delivered = self.deliver(event, |_| true);
        if delivered == 0 {
            log::debug!("No listeners for {} broadcast", event.kind());
        }
        delivered
    }

    /// Show a toast in the content surfaces of `tab`. Returns how many received it.
    pub fn toast(&self, tab: TabId, message: impl Into<String>, duration_ms: Option<u64>) -> usize {
        let event = SurfaceEvent::Toast {
            payload: ToastPayload {
                message: message.into(),
                duration_ms,
            },
        };
        let delivered = self.deliver(&event, |kind| kind == SurfaceKind::Content(tab));
        if delivered == 0 {
            log::debug!("No content surface in tab {} to show toast", tab);
        }
        delivered
    }

    /// Dismiss any toast in the content surfaces of `tab`.
    pub fn hide_toast(&self, tab: TabId) -> usize {
        self.deliver(&SurfaceEvent::HideToast, |kind| kind == SurfaceKind::Content(tab))
    }

    fn deliver(&self, event: &SurfaceEvent, wanted: impl Fn(SurfaceKind) -> bool) -> usize {
        let mut delivered = 0;
        self.surfaces.lock().retain(|surface| {
            if !wanted(surface.kind) {
                return true;
            }
            match surface.tx.send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => {
                    log::debug!("Surface {:?} went away, detaching", surface.id);
                    false
                }
            }
        });
        delivered
    }
}
