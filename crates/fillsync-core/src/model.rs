//! Model location and metadata resolution
//!
//! Resolves a model name to its source file and to the table/connection it
//! maps to. Metadata is read with lightweight text inspection of the model's
//! own source; model code is never loaded or executed. A file counts as a
//! model when its class extends one of the known Eloquent bases (again a
//! structural text check, not a class lookup).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::SyncConfig;
use crate::inflect;
use crate::{Error, Result};

/// Base classes whose subclasses are treated as models.
const ELOQUENT_BASES: &[&str] = &["Model", "Authenticatable", "Pivot", "MorphPivot"];

static TABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"protected\s+\$table\s*=\s*['"]([^'"]+)['"]"#).unwrap()
});

static CONNECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"protected\s+\$connection\s*=\s*['"]([^'"]+)['"]"#).unwrap()
});

static EXTENDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"extends\s+\\?(?:\w+\\)*(\w+)").unwrap());

static SOFT_DELETES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"use\s+(?:Illuminate\\Database\\Eloquent\\)?SoftDeletes\b").unwrap()
});

static DELETED_AT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"const\s+DELETED_AT\s*=\s*['"]([^'"]+)['"]"#).unwrap()
});

/// A resolved model: where it lives and what it maps to. Built once per run
/// per model; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    /// Model name as given (first letter upcased)
    pub name: String,
    /// Absolute path to the model source file
    pub path: PathBuf,
    /// Table the model maps to (declared override or convention default)
    pub table: String,
    /// Connection name (declared override or configured default)
    pub connection: String,
    /// Fully qualified class name per the namespace map
    pub class: String,
}

/// Resolves model names to [`ModelRef`]s and discovers models on disk.
#[derive(Debug)]
pub struct ModelLocator {
    root: PathBuf,
    models_dir: PathBuf,
    namespace_map: Vec<(String, String)>,
    default_connection: String,
}

impl ModelLocator {
    /// Create a locator rooted at the project directory.
    ///
    /// `base_override` replaces the configured models directory when given
    /// (the CLI's `--path` option).
    pub fn new(root: &Path, config: &SyncConfig, base_override: Option<&Path>) -> Self {
        let base = base_override.unwrap_or(&config.models_dir);
        let models_dir = if base.is_absolute() {
            base.to_path_buf()
        } else {
            root.join(base)
        };
        Self {
            root: root.to_path_buf(),
            models_dir,
            namespace_map: config
                .namespace_map
                .iter()
                .map(|m| (m.dir.clone(), m.namespace.clone()))
                .collect(),
            default_connection: config.default_connection.clone(),
        }
    }

    /// The directory models are resolved against.
    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Resolve a single model by name.
    pub fn resolve(&self, name: &str) -> Result<ModelRef> {
        let model_name = inflect::ucfirst(name);
        let path = self.models_dir.join(format!("{model_name}.php"));
        if !path.is_file() {
            return Err(Error::ModelNotFound {
                name: model_name,
                path,
            });
        }
        self.read_ref(&path)
    }

    /// Discover every model under the models directory, recursively, in
    /// sorted traversal order. Non-PHP files, backup sidecars, and files
    /// that do not structurally look like models are skipped.
    pub fn discover(&self) -> Result<Vec<ModelRef>> {
        if !self.models_dir.is_dir() {
            return Err(Error::BaseDirMissing {
                path: self.models_dir.clone(),
            });
        }

        let mut models = Vec::new();
        self.walk(&self.models_dir, &mut models)?;
        Ok(models)
    }

    fn walk(&self, dir: &Path, models: &mut Vec<ModelRef>) -> Result<()> {
        let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            if path.is_dir() {
                self.walk(&path, models)?;
                continue;
            }
            if path.extension().is_none_or(|e| e != "php") {
                continue;
            }
            let source = fs::read_to_string(&path)?;
            if !is_model_source(&source) {
                tracing::debug!(path = %path.display(), "skipping non-model source");
                continue;
            }
            models.push(self.ref_from_source(&path, &source));
        }
        Ok(())
    }

    fn read_ref(&self, path: &Path) -> Result<ModelRef> {
        let source = fs::read_to_string(path)?;
        Ok(self.ref_from_source(path, &source))
    }

    fn ref_from_source(&self, path: &Path, source: &str) -> ModelRef {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let table = table_override(source).unwrap_or_else(|| inflect::table_name(&name));
        let connection =
            connection_override(source).unwrap_or_else(|| self.default_connection.clone());
        let class = self.qualify(path, &name);

        ModelRef {
            name,
            path: path.to_path_buf(),
            table,
            connection,
            class,
        }
    }

    /// Resolve the fully qualified class name from the file path, using the
    /// first namespace mapping whose directory prefixes the path.
    fn qualify(&self, path: &Path, name: &str) -> String {
        let rel = path
            .strip_prefix(&self.root)
            .unwrap_or(path)
            .with_extension("");
        let rel = rel.to_string_lossy().replace('\\', "/");

        for (dir, namespace) in &self.namespace_map {
            let dir = dir.trim_end_matches('/');
            if let Some(rest) = rel.strip_prefix(dir) {
                let rest = rest.trim_start_matches('/');
                if rest.is_empty() {
                    return namespace.clone();
                }
                return format!("{namespace}\\{}", rest.replace('/', "\\"));
            }
        }
        name.to_string()
    }
}

/// Structural check: does this source define an Eloquent model?
pub fn is_model_source(source: &str) -> bool {
    EXTENDS_RE.captures(source).is_some_and(|caps| {
        let base = &caps[1];
        ELOQUENT_BASES.contains(&base) || base.ends_with("Model")
    })
}

/// Columns excluded for this model only, derived from its own source.
///
/// A model pulling in `SoftDeletes` gets its deleted-at column excluded,
/// honoring a `const DELETED_AT` override when present.
pub fn derived_exclusions(source: &str) -> Vec<String> {
    if !SOFT_DELETES_RE.is_match(source) {
        return Vec::new();
    }
    let column = DELETED_AT_RE
        .captures(source)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| "deleted_at".to_string());
    vec![column]
}

fn table_override(source: &str) -> Option<String> {
    TABLE_RE.captures(source).map(|caps| caps[1].to_string())
}

fn connection_override(source: &str) -> Option<String> {
    CONNECTION_RE.captures(source).map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PLAIN_MODEL: &str = r"<?php

namespace App\Models;

use Illuminate\Database\Eloquent\Model;

class Post extends Model
{
}
";

    const OVERRIDDEN_MODEL: &str = r"<?php

class LegacyPost extends Model
{
    protected $table = 'blog_posts';
    protected $connection = 'legacy';
}
";

    const SOFT_DELETE_MODEL: &str = r"<?php

use Illuminate\Database\Eloquent\Model;
use Illuminate\Database\Eloquent\SoftDeletes;

class Post extends Model
{
    use SoftDeletes;

    const DELETED_AT = 'removed_at';
}
";

    #[test]
    fn detects_model_sources() {
        assert!(is_model_source(PLAIN_MODEL));
        assert!(is_model_source("class A extends Authenticatable {}"));
        assert!(is_model_source("class A extends BaseModel {}"));
        assert!(!is_model_source("class Helper\n{\n}\n"));
        assert!(!is_model_source("class A extends Controller {}"));
    }

    #[test]
    fn reads_table_and_connection_overrides() {
        assert_eq!(table_override(OVERRIDDEN_MODEL).as_deref(), Some("blog_posts"));
        assert_eq!(connection_override(OVERRIDDEN_MODEL).as_deref(), Some("legacy"));
        assert_eq!(table_override(PLAIN_MODEL), None);
    }

    #[test]
    fn soft_deletes_derive_an_exclusion() {
        assert_eq!(derived_exclusions(SOFT_DELETE_MODEL), vec!["removed_at"]);
        assert!(derived_exclusions(PLAIN_MODEL).is_empty());

        let default_column = "use SoftDeletes;\nclass P extends Model {}";
        assert_eq!(derived_exclusions(default_column), vec!["deleted_at"]);
    }

    #[test]
    fn resolve_falls_back_to_convention_table() {
        let temp = tempfile::TempDir::new().unwrap();
        let models = temp.path().join("app/Models");
        fs::create_dir_all(&models).unwrap();
        fs::write(models.join("UserProfile.php"), PLAIN_MODEL).unwrap();

        let config = SyncConfig::default();
        let locator = ModelLocator::new(temp.path(), &config, None);
        let model = locator.resolve("userProfile").unwrap();

        assert_eq!(model.name, "UserProfile");
        assert_eq!(model.table, "user_profiles");
        assert_eq!(model.connection, "mysql");
        assert_eq!(model.class, "App\\Models\\UserProfile");
    }

    #[test]
    fn resolve_missing_model_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("app/Models")).unwrap();

        let config = SyncConfig::default();
        let locator = ModelLocator::new(temp.path(), &config, None);
        let err = locator.resolve("Ghost").unwrap_err();
        assert!(matches!(err, Error::ModelNotFound { .. }));
    }

    #[test]
    fn discover_skips_non_models_and_backups() {
        let temp = tempfile::TempDir::new().unwrap();
        let models = temp.path().join("app/Models");
        fs::create_dir_all(models.join("Admin")).unwrap();
        fs::write(models.join("Post.php"), PLAIN_MODEL).unwrap();
        fs::write(models.join("Post.php.backup"), PLAIN_MODEL).unwrap();
        fs::write(models.join("helpers.php"), "<?php function x() {}").unwrap();
        fs::write(models.join("Admin/Role.php"), "<?php class Role extends Model {}").unwrap();

        let config = SyncConfig::default();
        let locator = ModelLocator::new(temp.path(), &config, None);
        let found = locator.discover().unwrap();

        let names: Vec<_> = found.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Role", "Post"]);
    }

    #[test]
    fn discover_missing_base_dir_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = SyncConfig::default();
        let locator = ModelLocator::new(temp.path(), &config, None);
        assert!(matches!(
            locator.discover().unwrap_err(),
            Error::BaseDirMissing { .. }
        ));
    }
}
