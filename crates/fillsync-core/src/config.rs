//! Configuration loading for fillsync
//!
//! Settings live in a `fillsync.toml` at the project root. Every field has a
//! default, so a missing file yields a fully usable configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Name of the configuration file at the project root
pub const CONFIG_FILE: &str = "fillsync.toml";

/// Maps a source directory to the PHP namespace its classes live in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceMapping {
    /// Directory relative to the project root, e.g. `app/Models`
    pub dir: String,
    /// Namespace for classes under that directory, e.g. `App\Models`
    pub namespace: String,
}

/// fillsync configuration
///
/// Entries in `namespace_map` are ordered; the first mapping whose directory
/// prefixes a model's path wins when resolving the qualified class name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Column names never included in a synthesized declaration
    pub excluded_columns: Vec<String>,
    /// Schema-builder type tags never included (e.g. `json`, `timestamp`)
    pub excluded_types: Vec<String>,
    /// Ordered directory-to-namespace mappings
    pub namespace_map: Vec<NamespaceMapping>,
    /// Snapshot each model before mutating it (enables rollback)
    pub model_backup: bool,
    /// Directory holding model sources
    pub models_dir: PathBuf,
    /// Directory holding migration files
    pub migrations_dir: PathBuf,
    /// Connection name used when a model declares no override
    pub default_connection: String,
    /// External formatter run on each written file (e.g. `pint`)
    pub formatter: Option<String>,
    /// Command queried for live schema columns, invoked as `<cmd> <table>`
    pub catalog_command: Option<String>,
    /// Append-only audit log
    pub log_file: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            excluded_columns: vec![
                "created_at".to_string(),
                "updated_at".to_string(),
                "deleted_at".to_string(),
            ],
            excluded_types: Vec::new(),
            namespace_map: vec![NamespaceMapping {
                dir: "app/Models".to_string(),
                namespace: "App\\Models".to_string(),
            }],
            model_backup: true,
            models_dir: PathBuf::from("app/Models"),
            migrations_dir: PathBuf::from("database/migrations"),
            default_connection: "mysql".to_string(),
            formatter: None,
            catalog_command: None,
            log_file: PathBuf::from("storage/logs/fillsync.log"),
        }
    }
}

impl SyncConfig {
    /// Load configuration from `<root>/fillsync.toml`
    ///
    /// A missing file is not an error; defaults are returned instead.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            path,
            message: e.to_string(),
        })
    }
}
