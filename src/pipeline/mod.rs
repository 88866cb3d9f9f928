//! Concurrent validation pipeline.
//!
//! ```text
//! Enumerator ─▶ TaskSource ─(bounded)─▶ WorkerPool ×N ─(unordered)─▶ collector ─▶ Report
//!                   ▲                         ▲                         │
//!                   └──── CancellationToken ──┴─────────────────────────┘
//! ```
//!
//! - `source`: lists the enumerator once and hands descriptors to a bounded channel
//!   from a dedicated blocking thread.
//! - `pool`: N workers share the intake; each descriptor is executed by exactly one
//!   worker. The first execution failure cancels every stage.
//! - `collector`: buffers results until the stream closes, sorts by id, compares.
//! - `driver`: owns the cancellation scope and the run's state machine.
//!
//! ## Example
//!
//! ```ignore
//! let driver = PipelineDriver::new(&PipelineConfig::default(), enumerator, executor)?;
//! let report = driver.run(&expected).await?;
//! println!("{} of {} passed", report.passed(), report.len());
//! ```

pub mod collector;
mod driver;
mod pool;
mod source;
mod types;

pub use driver::{PipelineConfig, PipelineDriver, PipelineState};
pub use pool::{executor_fn, FnExecutor, PoolHandle, TaskExecutor, WorkerPool};
pub use source::{Descriptors, Enumerator, Selection, TaskSource};
pub use types::{
    ExpectedValues, Report, ReportLine, TaskDescriptor, TaskId, TaskReference, TaskResult,
};
