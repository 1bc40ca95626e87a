//! Checker construction errors.

use std::path::PathBuf;

use thiserror::Error;

/// Error constructing a checker.
#[derive(Error, Debug)]
pub enum CheckerError {
    /// The schema cache directory could not be created.
    #[error("failed creating schema cache directory {}: {source}", path.display())]
    CacheDir {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying filesystem error.
        source: std::io::Error,
    },

    /// The schema validator rejected its configuration.
    #[error("schema validator initialization failed: {0}")]
    Validator(#[from] kubecheck_schema::SchemaError),
}
