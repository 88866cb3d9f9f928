//! Pipeline driver: wires source, pool and collector together, owns the
//! cancellation scope and measures wall time.

use crate::error::ValidateError;
use crate::pipeline::collector;
use crate::pipeline::pool::{PoolHandle, TaskExecutor, WorkerPool};
use crate::pipeline::source::{Enumerator, TaskSource};
use crate::pipeline::types::{ExpectedValues, Report};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Settings the pipeline itself understands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Worker count. Defaults to the available hardware parallelism.
    #[serde(default)]
    pub workers: Option<usize>,

    /// Capacity of the descriptor and result channels.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    1
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: None,
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl PipelineConfig {
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: Some(workers),
            ..Self::default()
        }
    }

    /// Resolve the effective worker count.
    pub fn worker_count(&self) -> Result<usize, ValidateError> {
        match self.workers {
            Some(0) => Err(ValidateError::Config(
                "pipeline.workers must be at least 1".to_string(),
            )),
            Some(workers) => Ok(workers),
            None => Ok(std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.workers == Some(0) {
            return Err("workers must be at least 1".to_string());
        }
        if self.channel_capacity == 0 {
            return Err("channel_capacity must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Lifecycle of a single driver instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Discovering,
    Executing,
    Collecting,
    Done,
    Cancelled,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Cancelled)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Discovering => "discovering",
            PipelineState::Executing => "executing",
            PipelineState::Collecting => "collecting",
            PipelineState::Done => "done",
            PipelineState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Runs one validation batch. A driver runs at most once.
pub struct PipelineDriver {
    workers: usize,
    channel_capacity: usize,
    enumerator: Arc<dyn Enumerator>,
    executor: Arc<dyn TaskExecutor>,
    cancel: CancellationToken,
    state: Arc<RwLock<PipelineState>>,
}

impl PipelineDriver {
    pub fn new(
        config: &PipelineConfig,
        enumerator: Arc<dyn Enumerator>,
        executor: Arc<dyn TaskExecutor>,
    ) -> Result<Self, ValidateError> {
        config.validate().map_err(ValidateError::Config)?;
        Ok(Self {
            workers: config.worker_count()?,
            channel_capacity: config.channel_capacity,
            enumerator,
            executor,
            cancel: CancellationToken::new(),
            state: Arc::new(RwLock::new(PipelineState::Idle)),
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn state(&self) -> PipelineState {
        *self.state.read()
    }

    /// Token that cancels this run when triggered from outside.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cancellation. In-flight executor calls still run to completion.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Run the pipeline on the current tokio runtime.
    ///
    /// Any fatal error discards every collected result; no partial report is
    /// returned.
    pub async fn run(&self, expected: &ExpectedValues) -> Result<Report, ValidateError> {
        {
            let mut state = self.state.write();
            if *state != PipelineState::Idle {
                return Err(ValidateError::AlreadyStarted);
            }
            *state = PipelineState::Discovering;
        }

        // Stage failures cancel only this scope; an external cancel reaches it too.
        let scope = self.cancel.child_token();
        let started = Instant::now();
        info!(workers = self.workers, "Starting validation pipeline");

        match self.execute(&scope, expected, started).await {
            Ok(report) => {
                self.transition(PipelineState::Done);
                info!(
                    tasks = report.len(),
                    passed = report.passed(),
                    failed = report.failed(),
                    duration_ms = report.elapsed.as_millis(),
                    "Validation pipeline completed"
                );
                Ok(report)
            }
            Err(e) => {
                scope.cancel();
                self.transition(PipelineState::Cancelled);
                warn!(
                    error = %e,
                    duration_ms = started.elapsed().as_millis(),
                    "Validation pipeline aborted"
                );
                Err(e)
            }
        }
    }

    /// Run the pipeline on a dedicated multi-thread runtime.
    pub fn run_blocking(&self, expected: &ExpectedValues) -> Result<Report, ValidateError> {
        self.run_blocking_until(expected, std::future::pending::<()>())
    }

    /// Like [`run_blocking`](Self::run_blocking), cancelling the run once `interrupt`
    /// completes. The future is polled on the same runtime that runs the pipeline.
    pub fn run_blocking_until<F>(
        &self,
        expected: &ExpectedValues,
        interrupt: F,
    ) -> Result<Report, ValidateError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(ValidateError::Runtime(
                "Cannot block on the pipeline from within an async runtime; use run() instead"
                    .to_string(),
            ));
        }

        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.workers)
            .thread_name("verdict-worker")
            .enable_all()
            .build()
            .map_err(|e| ValidateError::Runtime(format!("Failed to create runtime: {}", e)))?;

        rt.block_on(async {
            let token = self.cancel.clone();
            let watcher = tokio::spawn(async move {
                interrupt.await;
                token.cancel();
            });
            let result = self.run(expected).await;
            watcher.abort();
            result
        })
    }

    async fn execute(
        &self,
        scope: &CancellationToken,
        expected: &ExpectedValues,
        started: Instant,
    ) -> Result<Report, ValidateError> {
        let (intake, producer) = TaskSource::spawn(
            Arc::clone(&self.enumerator),
            self.channel_capacity,
            scope.clone(),
        );

        self.transition(PipelineState::Executing);
        let PoolHandle { results, workers } = WorkerPool::spawn(
            intake,
            self.workers,
            self.channel_capacity,
            Arc::clone(&self.executor),
            scope.clone(),
        );

        let buffered = collector::drain(results).await;

        // The producer's failure wins; otherwise the first failing worker in spawn order.
        let mut failure = producer.await?.err();
        for outcome in futures::future::join_all(workers).await {
            if let Err(e) = outcome? {
                failure.get_or_insert(e);
            }
        }
        if let Some(e) = failure {
            // A task killed by the same interrupt that cancelled the run is not its own failure.
            if self.cancel.is_cancelled() && matches!(e, ValidateError::Execution { .. }) {
                debug!(error = %e, "Discarding task failure raised after cancellation");
                return Err(ValidateError::Cancelled);
            }
            return Err(e);
        }
        if self.cancel.is_cancelled() {
            return Err(ValidateError::Cancelled);
        }

        self.transition(PipelineState::Collecting);
        debug!(results = buffered.len(), "Collecting results");
        let lines = collector::collect(buffered, expected)?;

        Ok(Report {
            lines,
            elapsed: started.elapsed(),
        })
    }

    fn transition(&self, next: PipelineState) {
        let mut state = self.state.write();
        if !state.is_terminal() {
            debug!(from = %*state, to = %next, "Pipeline state transition");
            *state = next;
        }
    }
}
