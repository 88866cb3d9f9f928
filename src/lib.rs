//! Verdict: Concurrent Output Validation
//!
//! Discovers a batch of tasks, executes them on a bounded worker pool, and compares
//! each captured output with a known-correct value. The report is ordered by task id
//! regardless of completion order.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod expected;
pub mod logging;
pub mod pipeline;
