//! Command-line interface for simple-navigator.
//!
//! This module handles CLI argument parsing and the config subcommands.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use simple_navigator_config::{Config, LogLevel};

/// simple-navigator - double-press-to-confirm back/close and forward/reopen
#[derive(Parser)]
#[command(name = "simple-navigator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file to use instead of ~/.config/simple-navigator/config.yaml
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log level for the debug log file (off, error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Drive the orchestrator from stdin or a script file (default)
    Run {
        /// Read console commands from FILE instead of stdin
        #[arg(long, value_name = "FILE")]
        script: Option<PathBuf>,
    },

    /// Print the effective configuration as YAML
    PrintConfig,

    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Runtime options passed from CLI to the application
#[derive(Clone, Debug, Default)]
pub struct RuntimeOptions {
    /// Explicit config file path
    pub config_path: Option<PathBuf>,
    /// Log level from the command line
    pub log_level: Option<LogLevel>,
    /// Script file to run instead of reading stdin
    pub script: Option<PathBuf>,
}

impl RuntimeOptions {
    /// Load the config this run should use.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config_path {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
    }
}

/// Result of CLI processing
pub enum CliResult {
    /// Continue with normal application startup
    Continue(RuntimeOptions),
    /// Exit with the given code (subcommand completed)
    Exit(i32),
}

/// Process CLI arguments and handle subcommands
pub fn process_cli() -> CliResult {
    let cli = Cli::parse();

    let mut options = RuntimeOptions {
        config_path: cli.config,
        log_level: cli.log_level,
        script: None,
    };

    match cli.command {
        Some(Commands::PrintConfig) => exit_with(print_config(&options)),
        Some(Commands::InitConfig { force }) => {
            let path = options
                .config_path
                .clone()
                .unwrap_or_else(Config::config_path);
            exit_with(init_config(&path, force))
        }
        Some(Commands::Run { script }) => {
            options.script = script;
            CliResult::Continue(options)
        }
        None => CliResult::Continue(options),
    }
}

fn exit_with(result: anyhow::Result<()>) -> CliResult {
    match result {
        Ok(()) => CliResult::Exit(0),
        Err(e) => {
            eprintln!("simple-navigator: error: {e:#}");
            CliResult::Exit(1)
        }
    }
}

/// Print the effective configuration
fn print_config(options: &RuntimeOptions) -> anyhow::Result<()> {
    let config = options.load_config()?;
    print!("{}", serde_yaml_ng::to_string(&config)?);
    Ok(())
}

/// Write the default configuration to `path`
fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    Config::default().save_to(path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
