//! Confirmation state store.
//!
//! Holds the per-tab pending-close windows, the single global pending-reopen
//! window, and the reopen provenance map. Each window owns a tokio task that
//! removes the record when it expires; arming again for the same key aborts
//! the previous task first, so there is never more than one live timer per key.
//!
//! Lookups also compare against the deadline, so an expired record reads as
//! absent even if its expiry task has not run yet.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::gateway::TabId;

#[derive(Debug)]
struct PendingClose {
    armed_at: Instant,
    expires_at: Instant,
    generation: u64,
    timer: JoinHandle<()>,
}

#[derive(Debug)]
struct PendingReopen {
    tab: TabId,
    armed_at: Instant,
    expires_at: Instant,
    generation: u64,
    timer: JoinHandle<()>,
}

#[derive(Debug, Default)]
struct StoreInner {
    pending_close: HashMap<TabId, PendingClose>,
    pending_reopen: Option<PendingReopen>,
    /// reopened tab -> tab whose forward confirmation reopened it
    provenance: HashMap<TabId, TabId>,
    next_generation: u64,
}

impl StoreInner {
    fn bump_generation(&mut self) -> u64 {
        self.next_generation = self.next_generation.wrapping_add(1);
        self.next_generation
    }

    fn remove_close(&mut self, tab: TabId) -> bool {
        match self.pending_close.remove(&tab) {
            Some(record) => {
                record.timer.abort();
                log::debug!(
                    "Close confirmation for tab {} cleared after {:?}",
                    tab,
                    record.armed_at.elapsed()
                );
                true
            }
            None => false,
        }
    }

    fn remove_reopen(&mut self) -> Option<TabId> {
        let record = self.pending_reopen.take()?;
        record.timer.abort();
        log::debug!(
            "Reopen confirmation for tab {} cleared after {:?}",
            record.tab,
            record.armed_at.elapsed()
        );
        Some(record.tab)
    }
}

/// Timer-gated confirmation windows and reopen provenance.
#[derive(Debug)]
pub struct ConfirmationStore {
    inner: Arc<Mutex<StoreInner>>,
    window: Duration,
}

impl ConfirmationStore {
    /// Create an empty store whose confirmation windows last `window`.
    pub fn new(window: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner::default())),
            window,
        }
    }

    /// Open (or restart) the close confirmation window for `tab`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm_close(&self, tab: TabId) {
        let armed_at = Instant::now();
        let expires_at = armed_at + self.window;

        let mut inner = self.inner.lock();
        inner.remove_close(tab);
        let generation = inner.bump_generation();
        let timer = spawn_expiry(Arc::downgrade(&self.inner), expires_at, move |inner| {
            if inner
                .pending_close
                .get(&tab)
                .is_some_and(|record| record.generation == generation)
            {
                inner.pending_close.remove(&tab);
                log::debug!("Close confirmation for tab {} expired", tab);
            }
        });
        inner.pending_close.insert(
            tab,
            PendingClose {
                armed_at,
                expires_at,
                generation,
                timer,
            },
        );
        log::debug!("Close confirmation armed for tab {} ({:?})", tab, self.window);
    }

    /// True while a close confirmation window is open for `tab`.
    pub fn is_close_armed(&self, tab: TabId) -> bool {
        let mut inner = self.inner.lock();
        match inner.pending_close.get(&tab) {
            Some(record) if Instant::now() < record.expires_at => true,
            Some(_) => {
                inner.remove_close(tab);
                false
            }
            None => false,
        }
    }

    /// Cancel the close window for `tab`. Returns whether one was open.
    pub fn disarm_close(&self, tab: TabId) -> bool {
        self.inner.lock().remove_close(tab)
    }

    /// Open the reopen confirmation window for `tab`, replacing any window
    /// armed for another tab.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm_reopen(&self, tab: TabId) {
        let armed_at = Instant::now();
        let expires_at = armed_at + self.window;

        let mut inner = self.inner.lock();
        if let Some(previous) = inner.remove_reopen()
            && previous != tab
        {
            log::debug!("Reopen confirmation moved from tab {} to tab {}", previous, tab);
        }
        let generation = inner.bump_generation();
        let timer = spawn_expiry(Arc::downgrade(&self.inner), expires_at, move |inner| {
            if inner
                .pending_reopen
                .as_ref()
                .is_some_and(|record| record.generation == generation)
            {
                inner.pending_reopen = None;
                log::debug!("Reopen confirmation for tab {} expired", tab);
            }
        });
        inner.pending_reopen = Some(PendingReopen {
            tab,
            armed_at,
            expires_at,
            generation,
            timer,
        });
        log::debug!("Reopen confirmation armed for tab {} ({:?})", tab, self.window);
    }

    /// True only while the reopen window is open and was armed by `tab`.
    pub fn is_reopen_armed(&self, tab: TabId) -> bool {
        self.reopen_target() == Some(tab)
    }

    /// Tab that armed the open reopen window, if any.
    pub fn reopen_target(&self) -> Option<TabId> {
        let mut inner = self.inner.lock();
        let record = inner.pending_reopen.as_ref()?;
        if Instant::now() < record.expires_at {
            Some(record.tab)
        } else {
            inner.remove_reopen();
            None
        }
    }

    /// Cancel the reopen window. Returns whether one was open.
    pub fn disarm_reopen(&self) -> bool {
        self.inner.lock().remove_reopen().is_some()
    }

    /// Number of tabs with an open close window.
    pub fn pending_close_count(&self) -> usize {
        let now = Instant::now();
        self.inner
            .lock()
            .pending_close
            .values()
            .filter(|record| now < record.expires_at)
            .count()
    }

    /// Remember that `reopened` was brought back by a forward confirmation on `source`.
    pub fn record_provenance(&self, reopened: TabId, source: TabId) {
        self.inner.lock().provenance.insert(reopened, source);
    }

    /// Consume the provenance of `tab`. Single use.
    pub fn take_provenance(&self, tab: TabId) -> Option<TabId> {
        self.inner.lock().provenance.remove(&tab)
    }

    /// Drop every record tied to a tab the host just removed.
    pub fn on_tab_closed(&self, tab: TabId) {
        let mut inner = self.inner.lock();
        inner.remove_close(tab);
        if inner.provenance.remove(&tab).is_some() {
            log::debug!("Provenance for closed tab {} discarded", tab);
        }
        if inner
            .pending_reopen
            .as_ref()
            .is_some_and(|record| record.tab == tab)
        {
            inner.remove_reopen();
        }
    }
}

impl Drop for ConfirmationStore {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        for (_, record) in inner.pending_close.drain() {
            record.timer.abort();
        }
        if let Some(record) = inner.pending_reopen.take() {
            record.timer.abort();
        }
    }
}

fn spawn_expiry<F>(inner: Weak<Mutex<StoreInner>>, deadline: Instant, expire: F) -> JoinHandle<()>
where
    F: FnOnce(&mut StoreInner) + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep_until(deadline).await;
        if let Some(inner) = inner.upgrade() {
            expire(&mut inner.lock());
        }
    })
}
