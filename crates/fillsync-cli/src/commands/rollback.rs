//! Rollback command implementation

use std::path::Path;

use colored::Colorize;

use fillsync_core::{RollbackOutcome, SyncConfig, Syncer};

use crate::error::Result;

/// Run the rollback command for one model or, with "all", every candidate
/// file under the models directory.
pub fn run_rollback(root: &Path, name: &str, path_override: Option<&Path>) -> Result<()> {
    let config = SyncConfig::load(root)?;
    let syncer = Syncer::new(root, config, path_override);

    if name.eq_ignore_ascii_case("all") {
        println!("{} Rolling back all models...", "=>".blue().bold());
        for (path, outcome) in syncer.rollback_all()? {
            print_outcome(&path, outcome);
        }
    } else {
        let (path, outcome) = syncer.rollback_one(name)?;
        print_outcome(&path, outcome);
    }
    Ok(())
}

fn print_outcome(path: &Path, outcome: RollbackOutcome) {
    match outcome {
        RollbackOutcome::Restored => {
            println!(
                "{} Restored {} from backup",
                "OK".green().bold(),
                path.display().to_string().cyan()
            );
        }
        RollbackOutcome::NoBackup => {
            println!(
                "{} No backup found for {}",
                "WARN".yellow().bold(),
                path.display().to_string().cyan()
            );
        }
    }
}
