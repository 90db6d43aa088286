//! Schema-to-model field synchronization engine
//!
//! Keeps the mutable-field declarations of Eloquent model files
//! (`protected $fillable` / `protected $guarded`) in sync with the column
//! set described by the project's migrations or a live schema catalog.
//!
//! The pipeline per model: resolve the model source and its table name,
//! locate the matching schema sources, extract and filter the column set,
//! synthesize the updated declaration, back up the original, write, and run
//! the configured formatter; rolling the file back if the formatter fails.

pub mod audit;
pub mod backup;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod formatter;
pub mod inflect;
pub mod io;
pub mod locate;
pub mod model;
pub mod policy;
pub mod sync;
pub mod synthesize;

pub use audit::{AuditLog, Stage};
pub use catalog::{CommandCatalog, SchemaCatalog};
pub use config::{NamespaceMapping, SyncConfig};
pub use error::{Error, Result};
pub use extract::ColumnDef;
pub use locate::SchemaLocator;
pub use model::{ModelLocator, ModelRef};
pub use policy::{EffectivePolicy, ExclusionPolicy};
pub use sync::{
    EntityReport, RollbackOutcome, SyncOptions, SyncOutcome, SyncReport, Syncer,
};
pub use synthesize::{FieldMode, synthesize};
