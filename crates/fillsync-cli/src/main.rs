//! fillsync CLI
//!
//! Keeps Eloquent model fillable/guarded declarations in sync with the
//! schema described by the project's migrations or a live catalog.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    let cwd = std::env::current_dir()?;
    match cli.command {
        Commands::Sync {
            name,
            path,
            ignore,
            dry_run,
            guarded,
            live_schema,
            json,
        } => commands::run_sync(
            &cwd,
            &name,
            path.as_deref(),
            ignore,
            dry_run,
            guarded,
            live_schema,
            json,
        ),
        Commands::Rollback { name, path } => {
            commands::run_rollback(&cwd, &name, path.as_deref())
        }
    }
}
