//! Sync command implementation

use std::path::Path;

use colored::Colorize;

use fillsync_core::{
    EntityReport, FieldMode, SyncConfig, SyncOptions, SyncOutcome, SyncReport, Syncer,
};

use crate::error::{CliError, Result};

/// Run the sync command for one model or, with "all", every model.
#[allow(clippy::too_many_arguments)]
pub fn run_sync(
    root: &Path,
    name: &str,
    path_override: Option<&Path>,
    ignore: Vec<String>,
    dry_run: bool,
    guarded: bool,
    live_schema: bool,
    json: bool,
) -> Result<()> {
    let config = SyncConfig::load(root)?;
    let syncer = Syncer::new(root, config, path_override);
    let options = SyncOptions {
        dry_run,
        mode: if guarded {
            FieldMode::Guarded
        } else {
            FieldMode::Fillable
        },
        live_schema,
        ignore,
    };

    let report = if name.eq_ignore_ascii_case("all") {
        if !json {
            println!("{} Syncing all models...", "=>".blue().bold());
        }
        let mut report = SyncReport::default();
        for entry in syncer.sync_all(&options)?.entries {
            if !json {
                print_outcome(&entry);
            }
            report.push(entry);
        }
        report
    } else {
        let entry = syncer.sync_one(name, &options);
        if !json {
            print_outcome(&entry);
        }
        let mut report = SyncReport::default();
        report.push(entry);
        report
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    let failures = report
        .entries
        .iter()
        .filter(|e| e.outcome.is_failure())
        .count();
    if failures > 0 {
        return Err(CliError::user(format!(
            "{failures} model(s) failed to sync"
        )));
    }
    Ok(())
}

fn print_outcome(entry: &EntityReport) {
    match &entry.outcome {
        SyncOutcome::Committed { columns } => {
            println!(
                "{} Updated {} ({} fields)",
                "OK".green().bold(),
                entry.model.cyan(),
                columns.len()
            );
        }
        SyncOutcome::UpToDate => {
            println!(
                "{} {} already up to date",
                "OK".green().bold(),
                entry.model.cyan()
            );
        }
        SyncOutcome::NoOp { reason } => {
            println!(
                "{} {}: {}",
                "WARN".yellow().bold(),
                entry.model.cyan(),
                reason
            );
        }
        SyncOutcome::DryRun { diff } => {
            println!(
                "{} {} would change:",
                "=>".blue().bold(),
                entry.model.cyan()
            );
            print!("{diff}");
        }
        SyncOutcome::Failed { error } => {
            println!("{} {}: {}", "FAIL".red().bold(), entry.model.cyan(), error);
        }
        SyncOutcome::RolledBack { error } => {
            println!(
                "{} {} rolled back: {}",
                "FAIL".red().bold(),
                entry.model.cyan(),
                error
            );
        }
    }
}
