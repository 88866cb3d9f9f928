//! Error types for the verdict validation pipeline.

use crate::pipeline::TaskId;
use std::path::PathBuf;
use thiserror::Error;

/// Discovery-related errors raised by an enumerator or the task source
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to list {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Duplicate task id {0}")]
    DuplicateId(TaskId),

    #[error("Task id space exhausted after {0} tasks")]
    IdOverflow(u32),

    #[error("Enumeration failed: {0}")]
    Other(String),
}

/// Errors raised by a single executor invocation
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process exited with {status}: {output}")]
    NonZeroExit { status: String, output: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Fatal errors for a validation run.
///
/// Every variant aborts the whole run; a mismatching output is not an error and
/// surfaces as a failed report line instead.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("Task discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Task {id} failed to execute: {source}")]
    Execution {
        id: TaskId,
        #[source]
        source: ExecutionError,
    },

    #[error("Failed to read expected values from {path}: {source}")]
    ExpectedValues {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Task {id} has no expected value ({len} values loaded)")]
    IndexOutOfRange { id: TaskId, len: usize },

    #[error("Validation run was cancelled")]
    Cancelled,

    #[error("Pipeline has already been started")]
    AlreadyStarted,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl ValidateError {
    /// Whether this error came from an external cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ValidateError::Cancelled)
    }
}

impl From<config::ConfigError> for ValidateError {
    fn from(err: config::ConfigError) -> Self {
        ValidateError::Config(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ValidateError {
    fn from(err: tokio::task::JoinError) -> Self {
        ValidateError::Runtime(format!("Pipeline stage panicked: {}", err))
    }
}
