//! Live schema catalog collaborator
//!
//! When live-schema mode is enabled, file-based discovery is bypassed and
//! the catalog is asked for the table's current column listing. The catalog
//! is an external collaborator behind a trait; the shipped implementation
//! shells out to a configured command.

use std::process::Command;

use crate::{Error, Result};

/// Source of authoritative live column listings.
pub trait SchemaCatalog {
    /// The table's current columns, in the catalog's reported order.
    fn table_columns(&self, table: &str) -> Result<Vec<String>>;
}

/// Catalog backed by an external command.
///
/// Invoked as `<command> <table>`; expected to print one column name per
/// line on stdout and exit 0. Anything else is a catalog failure.
#[derive(Debug, Clone)]
pub struct CommandCatalog {
    command: String,
}

impl CommandCatalog {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl SchemaCatalog for CommandCatalog {
    fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        let mut parts = self.command.split_whitespace();
        let Some(program) = parts.next() else {
            return Err(Error::CatalogFailure {
                table: table.to_string(),
                message: "catalog command is empty".to_string(),
            });
        };

        let output = Command::new(program)
            .args(parts)
            .arg(table)
            .output()
            .map_err(|e| Error::CatalogFailure {
                table: table.to_string(),
                message: format!("failed to launch {program}: {e}"),
            })?;

        if !output.status.success() {
            return Err(Error::CatalogFailure {
                table: table.to_string(),
                message: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let columns = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Ok(columns)
    }
}
