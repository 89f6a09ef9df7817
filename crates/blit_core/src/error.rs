//! # Core Error Types
//!
//! Capacity overflow and degenerate regions are handled by policy and never
//! show up here. What remains is bad configuration and host draw failures.

use std::path::PathBuf;

use thiserror::Error;

use crate::surface::SurfaceError;

/// Errors that can occur in the core.
#[derive(Error, Debug)]
pub enum BlitError {
    /// Configuration values break an invariant.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The host canvas failed during a draw pass.
    #[error("host draw failure: {0}")]
    Surface(#[from] SurfaceError),
}

/// Result type for core operations.
pub type BlitResult<T> = Result<T, BlitError>;
