//! Logging for simple-navigator.
//!
//! All `log::info!()` etc. output goes to `simple_navigator_debug.log` in the
//! system temp directory, keeping stdout free for the console driver. When
//! `RUST_LOG` is set, records are mirrored to stderr as well.
//!
//! Level precedence: `--log-level` CLI flag, then `RUST_LOG`, then the
//! `log_level` config field (applied after the config is loaded).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use simple_navigator_config::LogLevel;

const LOG_FILE_NAME: &str = "simple_navigator_debug.log";

/// Set when the CLI flag or `RUST_LOG` fixed the level; config may not override it.
static LEVEL_PINNED: AtomicBool = AtomicBool::new(false);

static LOGGER: OnceLock<FileLogger> = OnceLock::new();

struct FileLogger {
    file: Mutex<Option<File>>,
    mirror_stderr: bool,
}

impl FileLogger {
    fn open(level: LevelFilter, mirror_stderr: bool) -> Self {
        if level == LevelFilter::Off {
            return Self {
                file: Mutex::new(None),
                mirror_stderr,
            };
        }

        let file = match OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(log_path())
        {
            Ok(mut f) => {
                let rule = "=".repeat(80);
                let _ = writeln!(
                    f,
                    "{rule}\nsimple-navigator {} debug session started at {} (level={})\n{rule}",
                    crate::VERSION,
                    timestamp(),
                    level
                );
                Some(f)
            }
            // Logging must never take the application down.
            Err(_) => None,
        };

        Self {
            file: Mutex::new(file),
            mirror_stderr,
        }
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format!(
            "[{}] [{:<5}] [{}] {}",
            timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        if let Some(file) = self.file.lock().as_mut() {
            let _ = writeln!(file, "{line}");
        }
        if self.mirror_stderr {
            eprintln!("{line}");
        }
    }

    fn flush(&self) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

/// Path of the debug log file.
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE_NAME)
}

fn timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
}

fn level_from_env() -> Option<LevelFilter> {
    std::env::var("RUST_LOG")
        .ok()
        .map(|value| parse_env_level(&value))
}

/// Pick our level out of a `RUST_LOG` value such as
/// `"simple_navigator=debug,tokio=warn"` or `"info"`.
///
/// A `simple_navigator` directive beats a bare level; directives for other
/// targets are ignored. Anything unparseable falls back to debug.
fn parse_env_level(value: &str) -> LevelFilter {
    let mut bare = None;
    for directive in value.split(',').map(str::trim) {
        match directive.split_once('=') {
            Some((target, level)) => {
                if target.trim() == env!("CARGO_CRATE_NAME")
                    && let Ok(level) = level.trim().parse::<LevelFilter>()
                {
                    return level;
                }
            }
            None => {
                if let Ok(level) = directive.parse::<LevelFilter>() {
                    bare = Some(level);
                }
            }
        }
    }
    bare.unwrap_or(LevelFilter::Debug)
}

/// Install the process-wide logger. Calling it more than once is harmless.
pub fn init_log_bridge(cli_level: Option<LogLevel>) {
    let env_level = level_from_env();
    let mirror_stderr = env_level.is_some();

    let level = match (cli_level, env_level) {
        (Some(cli), _) => Some(cli.to_level_filter()),
        (None, env) => env,
    };
    LEVEL_PINNED.store(level.is_some(), Ordering::Relaxed);
    let level = level.unwrap_or(LogLevel::default().to_level_filter());

    let logger = LOGGER.get_or_init(|| FileLogger::open(level, mirror_stderr));
    if log::set_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}

/// Apply the level from the config file unless the CLI or `RUST_LOG` already
/// chose one. Returns whether the level changed.
pub fn apply_config_level(level: LogLevel) -> bool {
    if LEVEL_PINNED.load(Ordering::Relaxed) {
        return false;
    }
    log::set_max_level(level.to_level_filter());
    true
}
