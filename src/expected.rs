//! Expected-value loading: one value per line, read eagerly before a run.

use crate::error::ValidateError;
use crate::pipeline::ExpectedValues;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Location of the expected values
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpectedConfig {
    /// Answers file, relative to the workspace
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

fn default_path() -> PathBuf {
    PathBuf::from("answers.txt")
}

impl Default for ExpectedConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl ExpectedValues {
    /// Read every line of `path`. Line `n` is the expected output of task `n`.
    pub fn load(path: &Path) -> Result<Self, ValidateError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ValidateError::ExpectedValues {
                path: path.to_path_buf(),
                source,
            })?;

        let values: ExpectedValues = content.lines().collect();
        debug!(path = %path.display(), values = values.len(), "Loaded expected values");
        Ok(values)
    }
}
