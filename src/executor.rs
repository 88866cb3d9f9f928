//! Command executor: runs each task as an external process.

use crate::error::ExecutionError;
use crate::pipeline::{TaskExecutor, TaskReference};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// How a task reference is turned into a process invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Program to run
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments placed before the task reference
    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

fn default_program() -> String {
    "go".to_string()
}

fn default_args() -> Vec<String> {
    vec!["run".to_string()]
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
        }
    }
}

impl ExecutorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.program.trim().is_empty() {
            return Err("program cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Runs `<program> <args...> <reference>` and captures stdout followed by stderr.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl CommandExecutor {
    pub fn new(program: impl Into<String>, working_dir: PathBuf) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir,
        }
    }

    pub fn from_config(config: &ExecutorConfig, working_dir: PathBuf) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            working_dir,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

impl TaskExecutor for CommandExecutor {
    fn execute(&self, reference: &TaskReference) -> Result<Vec<u8>, ExecutionError> {
        debug!(
            program = %self.program,
            reference = %reference,
            cwd = %self.working_dir.display(),
            "Spawning task process"
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(reference.as_str())
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ExecutionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);

        if !output.status.success() {
            return Err(ExecutionError::NonZeroExit {
                status: output.status.to_string(),
                output: String::from_utf8_lossy(&combined).trim_end().to_string(),
            });
        }

        Ok(combined)
    }
}
