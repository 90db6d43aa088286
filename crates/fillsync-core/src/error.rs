//! Error types for fillsync-core

use std::path::PathBuf;

/// Result type for fillsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fillsync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Model source file not found at the resolved path
    #[error("Model {name} does not exist at {path}")]
    ModelNotFound { name: String, path: PathBuf },

    /// Models base directory is missing
    #[error("Directory does not exist: {path}")]
    BaseDirMissing { path: PathBuf },

    /// External formatter returned a non-zero exit status
    #[error("Formatter failed with status {status}: {stderr}")]
    FormatterFailure { status: i32, stderr: String },

    /// Live schema catalog query failed
    #[error("Schema catalog query failed for table {table}: {message}")]
    CatalogFailure { table: String, message: String },

    /// Configuration file could not be parsed
    #[error("Failed to parse {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
