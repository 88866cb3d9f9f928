//! CLI parse: clap types for Verdict. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Verdict CLI - Concurrent validation of task outputs
#[derive(Parser, Debug)]
#[command(name = "verdict")]
#[command(about = "Run every task in a workspace concurrently and check its output")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, global = true, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Execute every task and compare its output with the expected values
    Run {
        /// Number of concurrent workers (default: available parallelism)
        #[arg(long, short = 'j')]
        workers: Option<usize>,
        /// Report format (text, table, json); defaults to output.format
        #[arg(long)]
        format: Option<String>,
        /// Expected values file (default: answers.txt in the workspace)
        #[arg(long)]
        answers: Option<PathBuf>,
        /// Exit with code 2 when any output mismatches
        #[arg(long)]
        strict: bool,
        /// Disable colored text output
        #[arg(long)]
        no_color: bool,
    },
    /// List discovered tasks without executing them
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the effective configuration as TOML
    Config,
}
