//! Entry point for loading configuration.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::VerdictConfig;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`VerdictConfig`] from the layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, user-level file, `verdict.toml`,
    /// `verdict.{VERDICT_ENV}.toml`, `VERDICT__SECTION__KEY` environment variables.
    pub fn load(workspace_root: &Path) -> Result<VerdictConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        Self::finish(builder)
    }

    /// Load configuration from an explicit file, which must exist.
    /// Environment variables still override it.
    pub fn load_from_file(path: &Path) -> Result<VerdictConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true));
        Self::finish(builder)
    }

    /// Path of the user-level config file, if the platform has one.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<VerdictConfig, ConfigError> {
        let config: VerdictConfig = builder
            .add_source(
                Environment::with_prefix("VERDICT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        debug!(
            workers = ?config.pipeline.workers,
            extension = %config.discovery.extension,
            program = %config.executor.program,
            "Configuration loaded"
        );
        Ok(config)
    }
}
