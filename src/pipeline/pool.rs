//! Worker pool: fans descriptors out to N workers and merges their results.

use crate::error::{ExecutionError, ValidateError};
use crate::pipeline::types::{TaskDescriptor, TaskReference, TaskResult};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Runs the work behind a task reference and returns its raw output.
///
/// Calls are synchronous and are never interrupted once started: cancellation only
/// keeps new calls from starting. Callers that need a deadline must enforce it
/// inside their implementation.
pub trait TaskExecutor: Send + Sync {
    fn execute(&self, reference: &TaskReference) -> Result<Vec<u8>, ExecutionError>;
}

/// Adapter that turns a closure into a [`TaskExecutor`].
pub struct FnExecutor<F>(F);

/// Wrap a closure as an executor.
pub fn executor_fn<F>(f: F) -> FnExecutor<F>
where
    F: Fn(&TaskReference) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    FnExecutor(f)
}

impl<F> TaskExecutor for FnExecutor<F>
where
    F: Fn(&TaskReference) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    fn execute(&self, reference: &TaskReference) -> Result<Vec<u8>, ExecutionError> {
        (self.0)(reference).map_err(ExecutionError::from)
    }
}

/// Handles for a running pool.
pub struct PoolHandle {
    /// Unordered results. Closes once every worker has exited.
    pub results: mpsc::Receiver<TaskResult>,
    /// One handle per worker, resolving to the number of tasks it executed.
    pub workers: Vec<JoinHandle<Result<usize, ValidateError>>>,
}

/// Consumer stage of the pipeline.
pub struct WorkerPool;

impl WorkerPool {
    /// Spawn `workers` consumers sharing `intake`.
    ///
    /// The first execution failure cancels `cancel`, which stops the producer and
    /// every other worker from taking new descriptors.
    pub fn spawn(
        intake: mpsc::Receiver<TaskDescriptor>,
        workers: usize,
        capacity: usize,
        executor: Arc<dyn TaskExecutor>,
        cancel: CancellationToken,
    ) -> PoolHandle {
        let intake = Arc::new(Mutex::new(intake));
        let (tx, results) = mpsc::channel(capacity.max(1));

        let handles = (0..workers.max(1))
            .map(|worker_id| {
                let intake = Arc::clone(&intake);
                let tx = tx.clone();
                let executor = Arc::clone(&executor);
                let cancel = cancel.clone();

                tokio::spawn(async move {
                    let outcome =
                        Self::worker_loop(worker_id, intake, tx, executor, cancel.clone()).await;
                    if let Err(ref e) = outcome {
                        error!(worker_id, error = %e, "Worker failed, cancelling pipeline");
                        cancel.cancel();
                    }
                    outcome
                })
            })
            .collect::<Vec<_>>();

        // Only worker-held senders remain, so the stream closes exactly once: when
        // the last worker exits.
        drop(tx);

        info!(worker_count = handles.len(), "Started worker pool");

        PoolHandle {
            results,
            workers: handles,
        }
    }

    async fn worker_loop(
        worker_id: usize,
        intake: Arc<Mutex<mpsc::Receiver<TaskDescriptor>>>,
        results: mpsc::Sender<TaskResult>,
        executor: Arc<dyn TaskExecutor>,
        cancel: CancellationToken,
    ) -> Result<usize, ValidateError> {
        debug!(worker_id, "Worker started");
        let mut executed = 0;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(worker_id, "Worker stopped by cancellation");
                    break;
                }
                descriptor = async { intake.lock().await.recv().await } => descriptor,
            };

            let Some(descriptor) = next else {
                break;
            };

            let id = descriptor.id;
            debug!(worker_id, task_id = %id, reference = %descriptor.reference, "Executing task");

            let executor = Arc::clone(&executor);
            let reference = descriptor.reference;
            let raw = tokio::task::spawn_blocking(move || executor.execute(&reference))
                .await?
                .map_err(|source| ValidateError::Execution { id, source })?;

            let result = TaskResult::from_raw(id, &raw);
            executed += 1;

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                sent = results.send(result) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }
        }

        debug!(worker_id, executed, "Worker finished");
        Ok(executed)
    }
}
