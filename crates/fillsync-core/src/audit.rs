//! Append-only audit log
//!
//! One line per stage transition:
//! `[<timestamp>] <stage> <file>: <mode> = [<col1>, <col2>, ...]`.
//! The log is write-only from the tool's perspective and is opened and
//! closed per append, so external processes tailing or appending to it are
//! never blocked.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::Result;

/// Stage a log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// About to mutate the file
    Before,
    /// Mutation written
    After,
    /// File restored from backup
    Rollback,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Before => "before",
            Stage::After => "after",
            Stage::Rollback => "rollback",
        };
        f.write_str(s)
    }
}

/// Appends audit entries to a line-oriented log file.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append one entry. Creates the log (and parent directories) on first
    /// use.
    pub fn append(
        &self,
        stage: Stage,
        file: &Path,
        mode: &str,
        columns: &[String],
    ) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!(
            "[{timestamp}] {stage} {}: {mode} = [{}]\n",
            file.display(),
            columns.join(", ")
        );

        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        log.write_all(line.as_bytes())?;
        Ok(())
    }
}
