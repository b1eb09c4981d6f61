//! In-memory browser host.
//!
//! [`SimulatedBrowser`] models a single window: ordered tabs, each with a
//! session history and a cursor into it, plus a stack of recently closed tabs.
//! It implements [`TabGateway`] for the console driver and the test suites,
//! and reports tab removals on a [`HostEvent`] channel the way a real host
//! fires its tab-removed notification.

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::HostError;
use crate::gateway::{NavDirection, RouteStack, TabGateway, TabId, TabInfo};

/// URL prefixes of pages that refuse the history probe.
const PRIVILEGED_PREFIXES: &[&str] = &["chrome://", "edge://", "about:", "chrome-extension://"];

/// Closed tabs remembered for restore; older ones are forgotten.
const MAX_CLOSED_TABS: usize = 25;

/// Notifications pushed by the host, independent of any command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A tab was closed, by the orchestrator or by anything else.
    TabRemoved(TabId),
}

#[derive(Debug, Clone)]
struct SimTab {
    id: TabId,
    history: Vec<String>,
    index: usize,
}

impl SimTab {
    fn url(&self) -> &str {
        self.history.get(self.index).map(String::as_str).unwrap_or("about:blank")
    }
}

#[derive(Debug)]
struct ClosedTab {
    history: Vec<String>,
    index: usize,
    position: usize,
}

#[derive(Debug, Default)]
struct BrowserInner {
    tabs: Vec<SimTab>,
    active: Option<TabId>,
    closed: Vec<ClosedTab>,
    next_id: u32,
}

impl BrowserInner {
    fn position(&self, tab: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab)
    }

    fn tab(&self, tab: TabId) -> Result<&SimTab, HostError> {
        self.tabs
            .iter()
            .find(|t| t.id == tab)
            .ok_or(HostError::TabNotFound(tab))
    }

    fn tab_mut(&mut self, tab: TabId) -> Result<&mut SimTab, HostError> {
        self.tabs
            .iter_mut()
            .find(|t| t.id == tab)
            .ok_or(HostError::TabNotFound(tab))
    }

    fn info(&self, tab: &SimTab) -> TabInfo {
        TabInfo {
            id: tab.id,
            url: tab.url().to_string(),
            active: self.active == Some(tab.id),
        }
    }

    fn allocate_id(&mut self) -> TabId {
        self.next_id += 1;
        TabId(self.next_id)
    }
}

/// A single-window browser kept entirely in memory.
#[derive(Debug, Default)]
pub struct SimulatedBrowser {
    inner: Mutex<BrowserInner>,
    events: Option<mpsc::UnboundedSender<HostEvent>>,
}

impl SimulatedBrowser {
    /// Create an empty window that does not report host events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty window that reports tab removals on `events`.
    pub fn with_events(events: mpsc::UnboundedSender<HostEvent>) -> Self {
        Self {
            inner: Mutex::new(BrowserInner::default()),
            events: Some(events),
        }
    }

    /// Open a new tab on `url` and make it active.
    pub fn open_tab(&self, url: &str) -> TabId {
        let mut inner = self.inner.lock();
        let id = inner.allocate_id();
        inner.tabs.push(SimTab {
            id,
            history: vec![url.to_string()],
            index: 0,
        });
        inner.active = Some(id);
        log::debug!("[host] opened tab {} on {}", id, url);
        id
    }

    /// Navigate `tab` to `url`, discarding any forward history.
    pub fn visit(&self, tab: TabId, url: &str) -> Result<(), HostError> {
        let mut inner = self.inner.lock();
        let sim = inner.tab_mut(tab)?;
        sim.history.truncate(sim.index + 1);
        sim.history.push(url.to_string());
        sim.index = sim.history.len() - 1;
        Ok(())
    }

    /// Switch the window's active tab, as a user clicking a tab would.
    pub fn switch_to(&self, tab: TabId) -> Result<(), HostError> {
        let mut inner = self.inner.lock();
        inner.tab(tab)?;
        inner.active = Some(tab);
        Ok(())
    }

    /// Open tabs in window order.
    pub fn tabs(&self) -> Vec<TabInfo> {
        let inner = self.inner.lock();
        inner.tabs.iter().map(|t| inner.info(t)).collect()
    }

    /// Id of the active tab, if any.
    pub fn active_tab_id(&self) -> Option<TabId> {
        self.inner.lock().active
    }

    /// Session history of `tab` and the index of its current entry.
    pub fn history(&self, tab: TabId) -> Option<(Vec<String>, usize)> {
        let inner = self.inner.lock();
        inner
            .tab(tab)
            .ok()
            .map(|t| (t.history.clone(), t.index))
    }

    /// Number of tabs available to restore.
    pub fn closed_count(&self) -> usize {
        self.inner.lock().closed.len()
    }

    /// Close `tab`, remember it for restore, and fire the removal notification.
    pub fn remove_tab(&self, tab: TabId) -> Result<(), HostError> {
        {
            let mut inner = self.inner.lock();
            let position = inner.position(tab).ok_or(HostError::TabNotFound(tab))?;
            let removed = inner.tabs.remove(position);
            inner.closed.push(ClosedTab {
                history: removed.history,
                index: removed.index,
                position,
            });
            if inner.closed.len() > MAX_CLOSED_TABS {
                let overflow = inner.closed.len() - MAX_CLOSED_TABS;
                inner.closed.drain(..overflow);
            }

            if inner.active == Some(tab) {
                // Focus moves to the right-hand neighbour, or the left one at the end.
                let next = position.min(inner.tabs.len().saturating_sub(1));
                inner.active = inner.tabs.get(next).map(|t| t.id);
            }
        }

        log::debug!("[host] tab {} removed", tab);
        if let Some(events) = &self.events
            && events.send(HostEvent::TabRemoved(tab)).is_err()
        {
            log::debug!("[host] no listener for tab removal of {}", tab);
        }
        Ok(())
    }

    fn navigate(&self, tab: TabId, direction: NavDirection) -> Result<(), HostError> {
        let mut inner = self.inner.lock();
        let sim = inner.tab_mut(tab)?;
        let target = match direction {
            NavDirection::Back => sim.index.checked_sub(1),
            NavDirection::Forward => Some(sim.index + 1).filter(|i| *i < sim.history.len()),
        };
        match target {
            Some(index) => {
                sim.index = index;
                Ok(())
            }
            None => Err(HostError::NavigationUnavailable { tab, direction }),
        }
    }
}

impl TabGateway for SimulatedBrowser {
    async fn active_tab(&self) -> Result<Option<TabInfo>, HostError> {
        let inner = self.inner.lock();
        Ok(inner
            .active
            .and_then(|id| inner.tab(id).ok())
            .map(|t| inner.info(t)))
    }

    async fn get_tab(&self, tab: TabId) -> Result<TabInfo, HostError> {
        let inner = self.inner.lock();
        inner.tab(tab).map(|t| inner.info(t))
    }

    async fn activate_tab(&self, tab: TabId) -> Result<(), HostError> {
        self.switch_to(tab)
    }

    async fn close_tab(&self, tab: TabId) -> Result<(), HostError> {
        self.remove_tab(tab)
    }

    async fn go_back(&self, tab: TabId) -> Result<(), HostError> {
        self.navigate(tab, NavDirection::Back)
    }

    async fn go_forward(&self, tab: TabId) -> Result<(), HostError> {
        self.navigate(tab, NavDirection::Forward)
    }

    async fn restore_last_closed(&self) -> Result<Option<TabId>, HostError> {
        let mut inner = self.inner.lock();
        let Some(closed) = inner.closed.pop() else {
            return Ok(None);
        };

        // Restored tabs come back under a fresh id.
        let id = inner.allocate_id();
        let position = closed.position.min(inner.tabs.len());
        inner.tabs.insert(
            position,
            SimTab {
                id,
                history: closed.history,
                index: closed.index,
            },
        );
        inner.active = Some(id);
        log::debug!("[host] restored closed tab as {}", id);
        Ok(Some(id))
    }

    async fn inspect_route_stack(&self, tab: TabId) -> Result<RouteStack, HostError> {
        let inner = self.inner.lock();
        let sim = inner.tab(tab)?;
        let url = sim.url();
        if PRIVILEGED_PREFIXES.iter().any(|prefix| url.starts_with(prefix)) {
            return Err(HostError::InjectionBlocked {
                tab,
                url: url.to_string(),
            });
        }
        Ok(RouteStack {
            length: sim.history.len(),
            state: None,
            url: url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_back_and_forward_move_the_cursor() {
        let browser = SimulatedBrowser::new();
        let tab = browser.open_tab("https://a.example");
        browser.visit(tab, "https://b.example").unwrap();

        assert!(browser.go_back(tab).await.is_ok());
        assert_eq!(browser.history(tab).unwrap().1, 0);
        assert!(matches!(
            browser.go_back(tab).await,
            Err(HostError::NavigationUnavailable { direction: NavDirection::Back, .. })
        ));
        assert!(browser.go_forward(tab).await.is_ok());
        assert!(browser.go_forward(tab).await.is_err());
    }

    #[tokio::test]
    async fn test_route_stack_counts_forward_entries() {
        let browser = SimulatedBrowser::new();
        let tab = browser.open_tab("https://a.example");
        browser.visit(tab, "https://b.example").unwrap();
        browser.go_back(tab).await.unwrap();

        let stack = browser.inspect_route_stack(tab).await.unwrap();
        assert_eq!(stack.length, 2);
        assert_eq!(stack.url, "https://a.example");
        assert!(!stack.is_exhausted());
    }

    #[tokio::test]
    async fn test_privileged_page_blocks_route_stack_read() {
        let browser = SimulatedBrowser::new();
        let tab = browser.open_tab("chrome://settings");
        assert!(matches!(
            browser.inspect_route_stack(tab).await,
            Err(HostError::InjectionBlocked { .. })
        ));
    }

    #[tokio::test]
    async fn test_close_and_restore_round_trip() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let browser = SimulatedBrowser::with_events(tx);
        let first = browser.open_tab("https://a.example");
        let second = browser.open_tab("https://b.example");

        browser.close_tab(second).await.unwrap();
        assert_eq!(rx.try_recv().unwrap(), HostEvent::TabRemoved(second));
        assert_eq!(browser.active_tab_id(), Some(first));

        let restored = browser.restore_last_closed().await.unwrap().unwrap();
        assert_ne!(restored, second);
        assert_eq!(browser.active_tab_id(), Some(restored));
        assert_eq!(browser.tabs()[1].url, "https://b.example");
        assert_eq!(browser.restore_last_closed().await.unwrap(), None);
    }

    #[test]
    fn test_closed_stack_is_bounded() {
        let browser = SimulatedBrowser::new();
        for i in 0..MAX_CLOSED_TABS + 5 {
            let tab = browser.open_tab(&format!("https://{i}.example"));
            browser.remove_tab(tab).unwrap();
        }
        assert_eq!(browser.closed_count(), MAX_CLOSED_TABS);
    }

    #[tokio::test]
    async fn test_unknown_tab_is_reported() {
        let browser = SimulatedBrowser::new();
        assert_eq!(
            browser.get_tab(TabId(42)).await,
            Err(HostError::TabNotFound(TabId(42)))
        );
        assert!(browser.close_tab(TabId(42)).await.is_err());
    }
}
