//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// fillsync - Keep model fillable/guarded fields in sync with the schema
#[derive(Parser, Debug)]
#[command(name = "fillsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Sync a model's fillable fields with its schema columns
    ///
    /// Pass a model name, or "all" to sync every model under the models
    /// directory.
    ///
    /// Examples:
    ///   fillsync sync User              # One model
    ///   fillsync sync all               # Every model
    ///   fillsync sync all --dry-run     # Preview without writing
    ///   fillsync sync User --guarded    # Write $guarded instead
    Sync {
        /// Model name, or "all" for every model
        name: String,

        /// Models directory override (default from fillsync.toml)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Model names to skip during a batch run
        #[arg(long)]
        ignore: Vec<String>,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Write a $guarded deny-list instead of $fillable
        #[arg(long)]
        guarded: bool,

        /// Query the live schema catalog instead of migration files
        #[arg(long)]
        live_schema: bool,

        /// Output the report as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Restore models from the backups a previous sync left behind
    ///
    /// Examples:
    ///   fillsync rollback User
    ///   fillsync rollback all
    Rollback {
        /// Model name, or "all" for every file under the models directory
        name: String,

        /// Models directory override (default from fillsync.toml)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}
