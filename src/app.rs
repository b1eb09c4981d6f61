//! Console application.
//!
//! Wires the orchestrator to the simulated browser and runs a line-oriented
//! driver loop over stdin or a script file. Every open tab gets a content
//! surface; a popup surface prints the status broadcasts.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use simple_navigator_config::{COMMAND_GO_BACK_OR_CLOSE, COMMAND_GO_FORWARD, Config};
use simple_navigator_keybindings::{KeyPress, KeybindingRegistry};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::cli::RuntimeOptions;
use crate::gateway::TabId;
use crate::orchestrator::{NavigationOrchestrator, OrchestratorState};
use crate::protocol::SurfaceEvent;
use crate::router::MessageRouter;
use crate::simulated_host::{HostEvent, SimulatedBrowser};
use crate::surfaces::{SurfaceHub, SurfaceKind};

const HELP: &str = "\
commands:
  open <url>      open a tab and make it active
  visit <url>     navigate the active tab to a new page
  switch <tab>    activate a tab
  close <tab>     close a tab from outside the orchestrator
  back            run the go-back-or-close shortcut
  forward         run the go-forward shortcut
  key <combo>     send a content key press, e.g. key Alt+[
  send <json>     send a raw surface message
  tabs            list open tabs
  logs            print the activity log
  sleep <ms>      wait, letting confirmation windows expire
  help            show this help
  quit            exit";

/// Main application
pub struct App {
    config: Config,
    options: RuntimeOptions,
}

impl App {
    /// Load the configuration and apply its log level.
    pub fn new(options: RuntimeOptions) -> Result<Self> {
        let config = options.load_config()?;
        if crate::debug::apply_config_level(config.log_level) {
            log::info!("Log level from config: {:?}", config.log_level);
        }
        Ok(Self { config, options })
    }

    /// Run the driver loop to completion.
    pub async fn run(self) -> Result<()> {
        let input: Box<dyn AsyncBufRead + Unpin + Send> = match &self.options.script {
            Some(path) => Box::new(open_script(path).await?),
            None => Box::new(BufReader::new(tokio::io::stdin())),
        };
        let interactive = self.options.script.is_none();

        let mut console = Console::new(&self.config);
        if interactive {
            println!("simple-navigator {} (type 'help')", crate::VERSION);
        }

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if !interactive {
                println!("> {line}");
            }

            let keep_going = match console.execute(line).await {
                Ok(keep_going) => keep_going,
                Err(e) => {
                    println!("error: {e:#}");
                    true
                }
            };
            console.pump();
            if !keep_going {
                break;
            }
        }

        log::info!("Console input finished");
        Ok(())
    }
}

async fn open_script(path: &Path) -> Result<BufReader<tokio::fs::File>> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open script {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Everything the driver loop touches.
struct Console {
    browser: Arc<SimulatedBrowser>,
    router: MessageRouter<SimulatedBrowser>,
    hub: Arc<SurfaceHub>,
    host_events: mpsc::UnboundedReceiver<HostEvent>,
    popup: mpsc::UnboundedReceiver<SurfaceEvent>,
    content: HashMap<TabId, mpsc::UnboundedReceiver<SurfaceEvent>>,
}

impl Console {
    fn new(config: &Config) -> Self {
        let (host_tx, host_events) = mpsc::unbounded_channel();
        let browser = Arc::new(SimulatedBrowser::with_events(host_tx));

        let hub = Arc::new(SurfaceHub::new());
        let (popup_tx, popup) = mpsc::unbounded_channel();
        hub.attach(SurfaceKind::Popup, popup_tx);

        let state = Arc::new(OrchestratorState::new(config, Arc::clone(&hub)));
        let orchestrator = NavigationOrchestrator::new(Arc::clone(&browser), state);
        let router = MessageRouter::new(
            orchestrator,
            KeybindingRegistry::from_config(&config.keybindings),
        );

        Self {
            browser,
            router,
            hub,
            host_events,
            popup,
            content: HashMap::new(),
        }
    }

    /// Run one console line. Returns `false` on `quit`.
    async fn execute(&mut self, line: &str) -> Result<bool> {
        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, arg)) => (verb, arg.trim()),
            None => (line, ""),
        };

        match verb {
            "open" => {
                let tab = self.browser.open_tab(require(arg, "url")?);
                println!("opened tab {tab}");
            }
            "visit" => {
                let tab = self.active_tab()?;
                self.browser.visit(tab, require(arg, "url")?)?;
            }
            "switch" => self.browser.switch_to(parse_tab(arg)?)?,
            "close" => self.browser.remove_tab(parse_tab(arg)?)?,
            "back" => {
                if let Some(outcome) = self.router.dispatch_command(COMMAND_GO_BACK_OR_CLOSE).await {
                    println!("{outcome:?}");
                }
            }
            "forward" => {
                if let Some(outcome) = self.router.dispatch_command(COMMAND_GO_FORWARD).await {
                    println!("{outcome:?}");
                }
            }
            "key" => {
                let press = key_press(require(arg, "key combination")?);
                match self.router.handle_key(&press).await {
                    Some(outcome) => println!("{outcome:?}"),
                    None => println!("key not bound"),
                }
            }
            "send" => match self.router.handle_message(require(arg, "json")?).await? {
                Some(reply) => println!("reply: {reply}"),
                None => println!("no reply"),
            },
            "tabs" => self.print_tabs(),
            "logs" => self.print_logs(),
            "sleep" => {
                let ms: u64 = require(arg, "milliseconds")?
                    .parse()
                    .context("sleep expects milliseconds")?;
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }
            "help" => println!("{HELP}"),
            "quit" | "exit" => return Ok(false),
            other => bail!("unknown command '{other}' (try 'help')"),
        }
        Ok(true)
    }

    /// Deliver host notifications, keep one content surface per tab, and
    /// print whatever the surfaces received.
    fn pump(&mut self) {
        while let Ok(event) = self.host_events.try_recv() {
            if let HostEvent::TabRemoved(tab) = event {
                self.content.remove(&tab);
            }
            self.router.on_host_event(event);
        }

        for info in self.browser.tabs() {
            self.content.entry(info.id).or_insert_with(|| {
                let (tx, rx) = mpsc::unbounded_channel();
                self.hub.attach(SurfaceKind::Content(info.id), tx);
                rx
            });
        }

        while let Ok(event) = self.popup.try_recv() {
            if let SurfaceEvent::Status { payload } = event {
                let latest = payload
                    .navigation_logs
                    .first()
                    .map(|entry| format!("{}: {}", entry.action, entry.detail))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "[popup] logging={} entries={} latest={}",
                    payload.logging_enabled,
                    payload.navigation_logs.len(),
                    latest
                );
            }
        }

        for (tab, rx) in &mut self.content {
            while let Ok(event) = rx.try_recv() {
                match event {
                    SurfaceEvent::Toast { payload } => {
                        println!("[tab {tab}] toast: {}", payload.message)
                    }
                    SurfaceEvent::HideToast => println!("[tab {tab}] toast dismissed"),
                    SurfaceEvent::Status { .. } => {}
                }
            }
        }
    }

    fn active_tab(&self) -> Result<TabId> {
        self.browser
            .active_tab_id()
            .context("no active tab (use 'open <url>')")
    }

    fn print_tabs(&self) {
        let tabs = self.browser.tabs();
        if tabs.is_empty() {
            println!("no tabs");
        }
        for info in tabs {
            let marker = if info.active { "*" } else { " " };
            let depth = self
                .browser
                .history(info.id)
                .map(|(history, index)| format!("{}/{}", index + 1, history.len()))
                .unwrap_or_default();
            println!("{marker} {:>3} {:<7} {}", info.id, depth, info.url);
        }
        println!("closed tabs available: {}", self.browser.closed_count());
    }

    fn print_logs(&self) {
        let snapshot = self.router.orchestrator().state().status.snapshot();
        if snapshot.navigation_logs.is_empty() {
            println!("activity log is empty");
        }
        for entry in snapshot.navigation_logs {
            println!("{} {:<12} {}", entry.id, entry.action, entry.detail);
        }
    }
}

fn require<'a>(arg: &'a str, what: &str) -> Result<&'a str> {
    if arg.is_empty() {
        bail!("missing {what}");
    }
    Ok(arg)
}

fn parse_tab(arg: &str) -> Result<TabId> {
    let id = require(arg, "tab id")?
        .parse()
        .with_context(|| format!("invalid tab id '{arg}'"))?;
    Ok(TabId(id))
}

/// Build a key press from a combination like `Alt+[` or `Ctrl+Shift+ArrowLeft`.
fn key_press(combo: &str) -> KeyPress {
    let (modifiers, key) = match combo.rsplit_once('+') {
        // "Alt++" presses the plus key.
        Some((modifiers, "")) => (modifiers.trim_end_matches('+'), "+"),
        Some((modifiers, key)) => (modifiers, key),
        None => ("", combo),
    };

    let mut press = KeyPress {
        key: key.to_string(),
        ..KeyPress::default()
    };
    for modifier in modifiers.split('+').filter(|m| !m.is_empty()) {
        match modifier.to_ascii_lowercase().as_str() {
            "alt" | "option" => press.alt_key = true,
            "ctrl" | "control" => press.ctrl_key = true,
            "shift" => press.shift_key = true,
            "meta" | "cmd" | "super" => press.meta_key = true,
            other => log::debug!("Ignoring unknown modifier '{}'", other),
        }
    }
    press
}
