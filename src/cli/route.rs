//! CLI route: single route table and run context. Builds the collaborators from the
//! effective configuration and dispatches to the pipeline and presentation.

use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_descriptors_json, format_descriptors_text, format_report_json,
    format_report_table, format_report_text,
};
use crate::config::{ConfigLoader, VerdictConfig};
use crate::discovery::DirectoryEnumerator;
use crate::error::ValidateError;
use crate::executor::CommandExecutor;
use crate::pipeline::{Descriptors, ExpectedValues, PipelineDriver, TaskDescriptor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Exit code for a completed run with at least one mismatch under `--strict`.
pub const MISMATCH_EXIT_CODE: i32 = 2;

/// Rendered command output and the process exit code that goes with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    pub exit_code: i32,
}

impl Outcome {
    fn success(output: String) -> Self {
        Self {
            output,
            exit_code: 0,
        }
    }
}

/// Runtime context for CLI execution: workspace root and effective configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config: VerdictConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
    ) -> Result<Self, ValidateError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Self::with_config(workspace_root, config)
    }

    /// Create run context from an already-built configuration.
    pub fn with_config(
        workspace_root: PathBuf,
        config: VerdictConfig,
    ) -> Result<Self, ValidateError> {
        config.validate().map_err(|errors| {
            ValidateError::Config(
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;
        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn config(&self) -> &VerdictConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn execute(&self, command: &Commands) -> Result<Outcome, ValidateError> {
        match command {
            Commands::Run {
                workers,
                format,
                answers,
                strict,
                no_color,
            } => self.handle_run(
                *workers,
                format.as_deref(),
                answers.as_deref(),
                *strict,
                *no_color,
            ),
            Commands::List { format } => self.handle_list(format),
            Commands::Config => self.handle_config(),
        }
    }

    fn handle_run(
        &self,
        workers: Option<usize>,
        format: Option<&str>,
        answers: Option<&Path>,
        strict: bool,
        no_color: bool,
    ) -> Result<Outcome, ValidateError> {
        let format = format.unwrap_or(self.config.output.format.as_str());
        if !matches!(format, "text" | "table" | "json") {
            return Err(ValidateError::Config(format!(
                "Invalid report format: {} (must be 'text', 'table' or 'json')",
                format
            )));
        }

        // Expected values are read up front so a missing file fails before any task runs.
        let answers_path = self.resolve(answers.unwrap_or(self.config.expected.path.as_path()));
        let expected = ExpectedValues::load(&answers_path)?;

        let mut pipeline = self.config.pipeline.clone();
        if workers.is_some() {
            pipeline.workers = workers;
        }

        let task_root = self.task_root();
        let enumerator = Arc::new(DirectoryEnumerator::with_config(
            task_root.clone(),
            self.config.discovery.clone(),
        ));
        let executor = Arc::new(CommandExecutor::from_config(&self.config.executor, task_root));
        let driver = PipelineDriver::new(&pipeline, enumerator, executor)?;

        info!(workers = driver.workers(), "Running validation");
        let report = driver.run_blocking_until(&expected, async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => warn!("Interrupt received, cancelling validation run"),
                Err(e) => {
                    warn!(error = %e, "Failed to listen for interrupts");
                    std::future::pending::<()>().await
                }
            }
        })?;

        let output = match format {
            "json" => format_report_json(&report)?,
            "table" => format_report_table(&report),
            _ => format_report_text(&report, self.config.output.color && !no_color),
        };
        let exit_code = if strict && !report.all_matched() {
            MISMATCH_EXIT_CODE
        } else {
            0
        };
        Ok(Outcome { output, exit_code })
    }

    fn handle_list(&self, format: &str) -> Result<Outcome, ValidateError> {
        let enumerator = Arc::new(DirectoryEnumerator::with_config(
            self.task_root(),
            self.config.discovery.clone(),
        ));
        let descriptors: Vec<TaskDescriptor> =
            Descriptors::new(enumerator)?.collect::<Result<_, _>>()?;

        let output = match format {
            "json" => format_descriptors_json(&descriptors)?,
            "text" => format_descriptors_text(&descriptors),
            other => {
                return Err(ValidateError::Config(format!(
                    "Invalid list format: {} (must be 'text' or 'json')",
                    other
                )))
            }
        };
        Ok(Outcome::success(output))
    }

    fn handle_config(&self) -> Result<Outcome, ValidateError> {
        let output = toml::to_string_pretty(&self.config)
            .map_err(|e| ValidateError::Config(format!("Failed to render configuration: {}", e)))?;
        Ok(Outcome::success(output.trim_end().to_string()))
    }

    fn task_root(&self) -> PathBuf {
        self.resolve(&self.config.discovery.root)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }
}
