//! Defaults seeded into the builder before any file or environment source.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with the scalar defaults applied.
///
/// Sequence defaults (`discovery.exclude`, `executor.args`) come from the serde
/// defaults instead, so a file can replace them wholesale.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("pipeline.channel_capacity", 1)?
        .set_default("discovery.root", ".")?
        .set_default("discovery.extension", "go")?
        .set_default("executor.program", "go")?
        .set_default("expected.path", "answers.txt")?
        .set_default("output.format", "text")?
        .set_default("logging.level", "info")
}
