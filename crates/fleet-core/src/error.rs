//! Error types for fleet-core

use std::path::PathBuf;

/// Result type for fleet-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fleet-core operations.
///
/// These are the structural failures that abort a reconciliation cycle.
/// Per-entity apply and teardown failures are not errors at this level;
/// they are collected in [`crate::CycleReport::failures`] so one entity
/// can never block the rest of the cycle.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found at the expected path
    #[error("configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// A required setting is absent or invalid
    #[error("configuration error: {message}")]
    Config { message: String },

    /// A source or transform file could not be read
    #[error("reading {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The transform directory exists but could not be listed
    #[error("listing transform directory {path}: {source}")]
    TransformDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source tree synchronization failed
    #[error("source sync: {message}")]
    Sync { message: String },

    /// The managed-identity set could not be enumerated
    #[error("identity directory: {message}")]
    Identity { message: String },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
