//! Sync orchestration
//!
//! Drives the per-model pipeline: resolve -> extract -> filter ->
//! synthesize -> back up -> write -> format, with rollback when the
//! formatter fails. Batch runs iterate the pipeline independently per
//! model; one model's failure never aborts the batch; every terminal
//! state lands in the aggregate report.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use similar::TextDiff;

use crate::audit::{AuditLog, Stage};
use crate::backup;
use crate::catalog::{CommandCatalog, SchemaCatalog};
use crate::config::SyncConfig;
use crate::extract::{self, ColumnDef};
use crate::formatter;
use crate::inflect;
use crate::io;
use crate::locate::SchemaLocator;
use crate::model::{self, ModelLocator, ModelRef};
use crate::policy::ExclusionPolicy;
use crate::synthesize::{FieldMode, synthesize};
use crate::{Error, Result};

/// Options for a sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Report what would change without touching any file
    pub dry_run: bool,
    /// Declaration mode to synthesize
    pub mode: FieldMode,
    /// Query the live catalog instead of migration files
    pub live_schema: bool,
    /// Model names skipped during batch runs
    pub ignore: Vec<String>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            mode: FieldMode::Fillable,
            live_schema: false,
            ignore: Vec::new(),
        }
    }
}

/// Terminal state of one model's pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Declaration written (and formatter, if any, succeeded)
    Committed { columns: Vec<String> },
    /// Synthesis produced the file's current content; nothing written
    UpToDate,
    /// Nothing to do (no schema source, no columns); a warning, not a failure
    NoOp { reason: String },
    /// Dry run: the change that would have been written
    DryRun { diff: String },
    /// Pipeline failed for this model
    Failed { error: String },
    /// Formatter failed and the pre-mutation content was restored
    RolledBack { error: String },
}

impl SyncOutcome {
    /// Whether this outcome should count against the run's exit status.
    pub fn is_failure(&self) -> bool {
        matches!(self, SyncOutcome::Failed { .. } | SyncOutcome::RolledBack { .. })
    }
}

/// One model's terminal state within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityReport {
    pub model: String,
    pub outcome: SyncOutcome,
}

/// Aggregate of a batch run; the batch never aborts on a single failure.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub entries: Vec<EntityReport>,
}

impl SyncReport {
    /// True when no entry terminated in failure or rollback.
    pub fn success(&self) -> bool {
        !self.entries.iter().any(|e| e.outcome.is_failure())
    }

    pub fn push(&mut self, entry: EntityReport) {
        self.entries.push(entry);
    }
}

/// Result of restoring one file during a rollback run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackOutcome {
    /// Backup existed and was applied
    Restored,
    /// No lingering backup for this file; a warning, not an error
    NoBackup,
}

/// Composes the locators, policy, backup, audit log, and collaborators
/// into per-model and batch sync/rollback runs.
pub struct Syncer {
    config: SyncConfig,
    policy: ExclusionPolicy,
    models: ModelLocator,
    schema: SchemaLocator,
    audit: AuditLog,
    catalog: Option<Box<dyn SchemaCatalog>>,
}

impl Syncer {
    /// Create a syncer rooted at the project directory.
    ///
    /// `base_override` replaces the configured models directory (the CLI's
    /// `--path` option). A configured `catalog_command` wires up the
    /// command-backed catalog automatically.
    pub fn new(root: &Path, config: SyncConfig, base_override: Option<&Path>) -> Self {
        let policy = ExclusionPolicy::from_config(&config);
        let models = ModelLocator::new(root, &config, base_override);
        let schema = SchemaLocator::new(root, &config);
        let log_file = if config.log_file.is_absolute() {
            config.log_file.clone()
        } else {
            root.join(&config.log_file)
        };
        let catalog: Option<Box<dyn SchemaCatalog>> = config
            .catalog_command
            .as_deref()
            .map(|cmd| Box::new(CommandCatalog::new(cmd)) as Box<dyn SchemaCatalog>);

        Self {
            config,
            policy,
            models,
            schema,
            audit: AuditLog::new(log_file),
            catalog,
        }
    }

    /// Replace the exclusion policy (e.g. to attach a predicate).
    pub fn with_policy(mut self, policy: ExclusionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the schema catalog collaborator.
    pub fn with_catalog(mut self, catalog: Box<dyn SchemaCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Sync a single named model.
    pub fn sync_one(&self, name: &str, options: &SyncOptions) -> EntityReport {
        match self.models.resolve(name) {
            Ok(model) => self.sync_model(&model, options),
            Err(e) => EntityReport {
                model: inflect::ucfirst(name),
                outcome: SyncOutcome::Failed {
                    error: e.to_string(),
                },
            },
        }
    }

    /// Sync every discovered model, independently, in discovery order.
    ///
    /// Only a missing base directory aborts; per-model failures are
    /// recorded in the report and the batch continues.
    pub fn sync_all(&self, options: &SyncOptions) -> Result<SyncReport> {
        let models = self.models.discover()?;
        let mut report = SyncReport::default();
        for model in models {
            if options.ignore.iter().any(|i| i == &model.name) {
                tracing::debug!(model = %model.name, "ignored by request");
                continue;
            }
            report.push(self.sync_model(&model, options));
        }
        Ok(report)
    }

    fn sync_model(&self, model: &ModelRef, options: &SyncOptions) -> EntityReport {
        tracing::debug!(
            model = %model.class,
            table = %model.table,
            connection = %model.connection,
            "syncing"
        );
        let outcome = self
            .run_pipeline(model, options)
            .unwrap_or_else(|e| SyncOutcome::Failed {
                error: e.to_string(),
            });
        EntityReport {
            model: model.name.clone(),
            outcome,
        }
    }

    fn run_pipeline(&self, model: &ModelRef, options: &SyncOptions) -> Result<SyncOutcome> {
        let source = fs::read_to_string(&model.path)?;

        // The soft-delete column is excluded per model, derived from its own
        // source; the shared policy is never mutated.
        let effective = self.policy.effective(model::derived_exclusions(&source));

        let columns = if options.live_schema {
            match self.catalog_columns(&model.table) {
                Ok(cols) => extract::extract_catalog(cols, &effective),
                Err(e) => {
                    // Catalog failures degrade to an empty extraction
                    tracing::warn!(table = %model.table, error = %e, "catalog query failed");
                    return Ok(SyncOutcome::NoOp {
                        reason: e.to_string(),
                    });
                }
            }
        } else {
            let sources = self.schema.locate(&model.table)?;
            if sources.is_empty() {
                return Ok(SyncOutcome::NoOp {
                    reason: format!("no migration found for table '{}'", model.table),
                });
            }
            extract::extract_files(&sources, &effective)?
        };

        if columns.is_empty() {
            return Ok(SyncOutcome::NoOp {
                reason: format!("no columns found for table '{}'", model.table),
            });
        }

        let updated = synthesize(&source, &columns, options.mode);
        if updated == source {
            return Ok(SyncOutcome::UpToDate);
        }

        if options.dry_run {
            return Ok(SyncOutcome::DryRun {
                diff: render_diff(&model.path, &source, &updated),
            });
        }

        self.apply(model, options.mode, &columns, &updated)
    }

    /// The mutating tail of the pipeline: backup, write, post-process.
    fn apply(
        &self,
        model: &ModelRef,
        mode: FieldMode,
        columns: &[ColumnDef],
        updated: &str,
    ) -> Result<SyncOutcome> {
        let names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
        self.audit
            .append(Stage::Before, &model.path, mode.property(), &names)?;

        // The snapshot must be durable before the write is allowed to start.
        let backed_up = if self.config.model_backup {
            backup::snapshot(&model.path)?;
            true
        } else {
            false
        };

        io::write_atomic(&model.path, updated.as_bytes())?;
        self.audit
            .append(Stage::After, &model.path, mode.property(), &names)?;

        if let Some(cmd) = &self.config.formatter
            && let Err(e) = formatter::run_formatter(cmd, &model.path)
        {
            if backed_up && backup::restore(&model.path)? {
                self.audit
                    .append(Stage::Rollback, &model.path, "restored", &[])?;
                return Ok(SyncOutcome::RolledBack {
                    error: e.to_string(),
                });
            }
            // Documented trade-off: with backups disabled the mutation stands
            return Ok(SyncOutcome::Failed {
                error: format!("{e} (no backup available; file left modified)"),
            });
        }

        Ok(SyncOutcome::Committed { columns: names })
    }

    fn catalog_columns(&self, table: &str) -> Result<Vec<String>> {
        match &self.catalog {
            Some(catalog) => catalog.table_columns(table),
            None => Err(Error::CatalogFailure {
                table: table.to_string(),
                message: "live schema requested but no catalog_command configured".to_string(),
            }),
        }
    }

    /// Roll back a single named model from its backup.
    ///
    /// Works from the sidecar alone; the process that made the change does
    /// not need to be alive. The file does not need to parse as a model.
    /// A missing models directory is an error, not a missing backup.
    pub fn rollback_one(&self, name: &str) -> Result<(PathBuf, RollbackOutcome)> {
        let dir = self.models.models_dir();
        if !dir.is_dir() {
            return Err(Error::BaseDirMissing {
                path: dir.to_path_buf(),
            });
        }
        let model_name = inflect::ucfirst(name);
        let path = dir.join(format!("{model_name}.php"));
        let outcome = self.restore_file(&path)?;
        Ok((path, outcome))
    }

    /// Roll back every candidate file under the models directory.
    ///
    /// Files without a backup are reported as warnings; they never abort
    /// the batch.
    pub fn rollback_all(&self) -> Result<Vec<(PathBuf, RollbackOutcome)>> {
        let dir = self.models.models_dir().to_path_buf();
        if !dir.is_dir() {
            return Err(Error::BaseDirMissing { path: dir });
        }

        let mut results = Vec::new();
        for path in php_files(&dir)? {
            let outcome = self.restore_file(&path)?;
            results.push((path, outcome));
        }
        Ok(results)
    }

    fn restore_file(&self, path: &Path) -> Result<RollbackOutcome> {
        if backup::restore(path)? {
            self.audit.append(Stage::Rollback, path, "restored", &[])?;
            Ok(RollbackOutcome::Restored)
        } else {
            Ok(RollbackOutcome::NoBackup)
        }
    }
}

/// Unified diff between the current and proposed model source.
fn render_diff(path: &Path, current: &str, proposed: &str) -> String {
    let label = path.display().to_string();
    let diff = TextDiff::from_lines(current, proposed);
    diff.unified_diff()
        .context_radius(3)
        .header(&label, "proposed")
        .to_string()
}

/// All `.php` files under a directory, recursively, in sorted order.
/// Backup sidecars are excluded by their `.backup` extension.
fn php_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            files.extend(php_files(&path)?);
        } else if path.extension().is_some_and(|e| e == "php") {
            files.push(path);
        }
    }
    Ok(files)
}
