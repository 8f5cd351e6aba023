//! Sentinel — keeps a game server session alive and maintains its data.
//!
//! # Usage
//!
//! ```text
//! sentinel [--config <path>] [--log-json]            (same as `run`)
//! sentinel run [--once]
//! sentinel backup [--force]
//! sentinel purge
//! sentinel status [--json]
//! sentinel config
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{backup::BackupArgs, run::RunArgs, status::StatusArgs};
use sentinel_core::{config, Config};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "sentinel",
    version,
    about = "Supervise a server session with scheduled backups and crash-log cleanup",
    long_about = None,
)]
struct Cli {
    /// Config file (default: ~/.sentinel/config.yaml, built-in defaults if absent).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit log lines as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the supervisor loop in the foreground (default).
    Run(RunArgs),

    /// Take a snapshot of the configured backup items now.
    Backup(BackupArgs),

    /// Delete everything in the crash-report directory now.
    Purge,

    /// Show server liveness, latest snapshot, and pending crash reports.
    Status(StatusArgs),

    /// Print the effective configuration as YAML.
    Config,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    sentinel_daemon::init_tracing(cli.log_json);

    let config = load_config(cli.config.as_deref())?;
    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => args.run(config),
        Commands::Backup(args) => args.run(&config),
        Commands::Purge => commands::purge::run(&config),
        Commands::Status(args) => args.run(&config),
        Commands::Config => commands::config::run(&config),
    }
}

fn load_config(explicit: Option<&std::path::Path>) -> Result<Config> {
    match explicit {
        Some(path) => config::load(Some(path))
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => config::load(None).context("failed to load config"),
    }
}
