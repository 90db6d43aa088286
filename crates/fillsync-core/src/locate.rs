//! Schema source discovery
//!
//! Finds the migration files describing a table. Filename matches against
//! the `create_<table>_table` convention come first; a content search for
//! builder openings on the table catches alteration migrations and
//! unconventionally named files. All matches are returned oldest first so
//! later alterations are applied after the base definition.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::Result;
use crate::config::SyncConfig;

/// Locates the schema sources for a table within the migrations directory.
#[derive(Debug)]
pub struct SchemaLocator {
    migrations_dir: PathBuf,
}

impl SchemaLocator {
    /// Create a locator rooted at the project directory.
    pub fn new(root: &Path, config: &SyncConfig) -> Self {
        let migrations_dir = if config.migrations_dir.is_absolute() {
            config.migrations_dir.clone()
        } else {
            root.join(&config.migrations_dir)
        };
        Self { migrations_dir }
    }

    /// Find every migration referencing `table`, ordered by modification
    /// time ascending (filename as tiebreak). A missing migrations directory
    /// yields an empty result, not an error.
    pub fn locate(&self, table: &str) -> Result<Vec<PathBuf>> {
        if !self.migrations_dir.is_dir() {
            tracing::debug!(
                dir = %self.migrations_dir.display(),
                "migrations directory missing"
            );
            return Ok(Vec::new());
        }

        let mut candidates = Vec::new();
        for entry in fs::read_dir(&self.migrations_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|e| e == "php") {
                candidates.push(path);
            }
        }

        let creation_pattern = format!("create_{table}_table");
        let mut matches: Vec<PathBuf> = candidates
            .iter()
            .filter(|p| {
                p.file_name()
                    .is_some_and(|n| n.to_string_lossy().contains(&creation_pattern))
            })
            .cloned()
            .collect();

        // Content search catches alteration migrations and unconventionally
        // named creations. Only a builder opening on this table counts; a
        // quoted table name elsewhere in the file (a foreign key's
        // `constrained('users')`, say) must not pull in another table's
        // migration.
        for path in &candidates {
            if matches.contains(path) {
                continue;
            }
            let content = fs::read_to_string(path)?;
            if opens_table(&content, table) {
                matches.push(path.clone());
            }
        }

        matches.sort_by_key(|p| (modified(p), p.file_name().map(|n| n.to_os_string())));
        Ok(matches)
    }
}

/// Whether the migration opens a schema builder on `table`. Matches
/// `Schema::create('<table>'` and `Schema::table('<table>'` with either
/// quote style, including the connection-chained forms.
fn opens_table(content: &str, table: &str) -> bool {
    ["create", "table"].iter().any(|verb| {
        ['\'', '"'].iter().any(|quote| {
            content.contains(&format!("{verb}({quote}{table}{quote}"))
        })
    })
}

fn modified(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}
