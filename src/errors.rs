// src/errors.rs

//! Crate-wide error types.
//!
//! [`OprunError`] covers everything the runner itself can get wrong (single
//! flight violations, misuse, configuration). Failures of the *operation* are
//! a different thing: they travel to the completion handler unchanged as an
//! [`OperationError`] and never surface as an `OprunError`.

use thiserror::Error;

use crate::types::RunId;

#[derive(Error, Debug)]
pub enum OprunError {
    #[error(
        "cannot start operation '{requested}' while operation '{running}' ({running_id}) is already running"
    )]
    AlreadyRunning {
        requested: String,
        running: String,
        running_id: RunId,
    },

    #[error("operation runner {0} was already started")]
    AlreadyStarted(RunId),

    #[error("await_completion called from the foreground dispatch context")]
    AwaitOnForeground,

    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("worker thread of {0} panicked outside the operation body")]
    WorkerPanicked(RunId),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure of an operation, as seen by its completion handler.
#[derive(Error, Debug)]
pub enum OperationError {
    /// The operation returned an error.
    #[error("operation failed: {0:#}")]
    Failed(#[source] anyhow::Error),

    /// The operation body panicked; the payload message is kept when it was a
    /// string.
    #[error("operation panicked: {0}")]
    Panicked(String),
}

impl OperationError {
    pub fn is_panic(&self) -> bool {
        matches!(self, OperationError::Panicked(_))
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, OprunError>;
