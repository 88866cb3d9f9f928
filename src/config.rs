//! Configuration System
//!
//! Layered configuration for validation runs: built-in defaults, a user-level file,
//! a workspace file and `VERDICT__`-prefixed environment variables, in increasing
//! order of precedence.

use crate::discovery::DiscoveryConfig;
use crate::executor::ExecutorConfig;
use crate::expected::ExpectedConfig;
use crate::logging::LoggingConfig;
use crate::pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerdictConfig {
    /// Worker pool settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Task discovery convention
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Task process invocation
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// Expected-value source
    #[serde(default)]
    pub expected: ExpectedConfig,

    /// Report rendering
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Report rendering settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    /// Report format: text, table, json
    #[serde(default = "default_output_format")]
    pub format: String,

    /// Colorize text reports
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_output_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_output_format(),
            color: default_true(),
        }
    }
}

impl OutputConfig {
    pub fn validate(&self) -> Result<(), String> {
        match self.format.as_str() {
            "text" | "table" | "json" => Ok(()),
            other => Err(format!(
                "Invalid report format: {} (must be 'text', 'table' or 'json')",
                other
            )),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Pipeline(String),
    Discovery(String),
    Executor(String),
    Output(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Pipeline(msg) => write!(f, "pipeline: {}", msg),
            ValidationError::Discovery(msg) => write!(f, "discovery: {}", msg),
            ValidationError::Executor(msg) => write!(f, "executor: {}", msg),
            ValidationError::Output(msg) => write!(f, "output: {}", msg),
            ValidationError::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl VerdictConfig {
    /// Validate the entire configuration, collecting every problem found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = [
            self.pipeline.validate().map_err(ValidationError::Pipeline),
            self.discovery.validate().map_err(ValidationError::Discovery),
            self.executor.validate().map_err(ValidationError::Executor),
            self.output.validate().map_err(ValidationError::Output),
            self.logging.validate().map_err(ValidationError::Logging),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
