//! Error types for hazard processing.

use grib2_parser::Grib2Error;
use swi_common::GridError;
use thiserror::Error;

/// Result type alias using ProcessorError.
pub type Result<T> = std::result::Result<T, ProcessorError>;

/// Failure of a decode or simulation run. Any of these aborts the whole run.
#[derive(Error, Debug)]
pub enum ProcessorError {
    /// A feed could not be decoded.
    #[error("feed decode failed: {0}")]
    Decode(#[from] Grib2Error),

    /// A mesh could not be mapped onto a decoded grid.
    #[error("grid lookup failed: {0}")]
    Grid(#[from] GridError),

    /// Invalid processor configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Catalog or adjustment input does not fit the decoded feeds.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// The run was cancelled before it completed.
    #[error("run cancelled")]
    Cancelled,

    /// The worker pool could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

impl ProcessorError {
    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a Catalog error.
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }
}
