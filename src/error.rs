// src/error.rs

//! Error types for recipe execution
//!
//! Every lifecycle hook fails fast: an error aborts the remaining hooks
//! for the current build and is handed back to the caller unchanged.

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while declaring or executing a recipe
#[derive(Error, Debug)]
pub enum Error {
    /// Recipe metadata failed validation at construction time
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    /// Source tree could not be materialized
    #[error("source retrieval failed: {0}")]
    SourceRetrieval(String),

    /// Build system could not be configured
    #[error("configuration failed: {0}")]
    Configuration(String),

    /// Build system ran and reported failure
    #[error("build failed: {0}")]
    Build(String),

    /// An artifact could not be written into the package layout
    #[error("packaging failed: {0}")]
    Packaging(String),

    /// Recipe text could not be parsed
    #[error("parse error: {0}")]
    ParseError(String),

    /// Filesystem operation failed with context
    #[error("I/O error: {0}")]
    IoError(String),

    /// Path tried to escape its root
    #[error("path traversal rejected: {0}")]
    PathTraversal(String),

    /// Path is empty or otherwise unusable
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error came from the external build system
    pub fn is_build_failure(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Build(_))
    }
}
