//! Task source: turns an enumerator listing into a bounded stream of descriptors.

use crate::error::{DiscoveryError, ValidateError};
use crate::pipeline::types::{TaskDescriptor, TaskId, TaskReference};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// An entry accepted by the enumerator's selection convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Id parsed from the entry name, if the convention encodes one.
    pub id: Option<TaskId>,
    pub reference: TaskReference,
}

/// Lists candidate entries and decides which of them are tasks.
pub trait Enumerator: Send + Sync {
    /// List the enumeration source once. Failure is fatal for the run.
    fn list(&self) -> Result<Vec<String>, DiscoveryError>;

    /// Apply the selection convention to one listed entry.
    fn select(&self, entry: &str) -> Option<Selection>;
}

/// Lazy, non-restartable sequence of descriptors in discovery order.
pub struct Descriptors {
    enumerator: Arc<dyn Enumerator>,
    entries: std::vec::IntoIter<String>,
    ordinal: u32,
    seen: HashSet<TaskId>,
}

impl Descriptors {
    /// Lists the enumerator. Selection and id assignment happen on iteration.
    pub fn new(enumerator: Arc<dyn Enumerator>) -> Result<Self, DiscoveryError> {
        let entries = enumerator.list()?;
        debug!(entries = entries.len(), "Enumeration source listed");
        Ok(Self {
            enumerator,
            entries: entries.into_iter(),
            ordinal: 0,
            seen: HashSet::new(),
        })
    }

    fn assign(&mut self, selection: Selection) -> Result<TaskDescriptor, DiscoveryError> {
        self.ordinal = self
            .ordinal
            .checked_add(1)
            .ok_or(DiscoveryError::IdOverflow(self.ordinal))?;

        let id = match selection.id {
            Some(id) => id,
            None => TaskId::new(self.ordinal).ok_or(DiscoveryError::IdOverflow(self.ordinal))?,
        };

        if !self.seen.insert(id) {
            return Err(DiscoveryError::DuplicateId(id));
        }

        Ok(TaskDescriptor {
            id,
            reference: selection.reference,
        })
    }
}

impl Iterator for Descriptors {
    type Item = Result<TaskDescriptor, DiscoveryError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(entry) = self.entries.next() {
            match self.enumerator.select(&entry) {
                Some(selection) => return Some(self.assign(selection)),
                None => debug!(entry = %entry, "Entry does not match task convention"),
            }
        }
        None
    }
}

/// Producer stage of the pipeline.
pub struct TaskSource;

/// Outcome of handing one descriptor to the intake.
enum Handoff {
    Sent,
    Closed,
    Cancelled,
}

impl TaskSource {
    /// Start producing on a dedicated blocking thread.
    ///
    /// The returned channel holds at most `capacity` undelivered descriptors; the
    /// producer blocks once it is full, until a slot frees up or `cancel` fires.
    /// The join handle resolves to the number of descriptors handed off.
    pub fn spawn(
        enumerator: Arc<dyn Enumerator>,
        capacity: usize,
        cancel: CancellationToken,
    ) -> (
        mpsc::Receiver<TaskDescriptor>,
        JoinHandle<Result<usize, ValidateError>>,
    ) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let runtime = Handle::current();
        let handle = tokio::task::spawn_blocking(move || {
            let outcome = Self::produce(enumerator, &runtime, &tx, &cancel);
            if let Err(ref e) = outcome {
                warn!(error = %e, "Task source failed, cancelling pipeline");
                cancel.cancel();
            }
            outcome
        });
        (rx, handle)
    }

    fn produce(
        enumerator: Arc<dyn Enumerator>,
        runtime: &Handle,
        tx: &mpsc::Sender<TaskDescriptor>,
        cancel: &CancellationToken,
    ) -> Result<usize, ValidateError> {
        let mut yielded = 0;

        for descriptor in Descriptors::new(enumerator)? {
            if cancel.is_cancelled() {
                debug!(yielded, "Task source stopped by cancellation");
                return Ok(yielded);
            }

            let descriptor = descriptor?;
            let id = descriptor.id;
            match Self::hand_off(runtime, tx, cancel, descriptor) {
                Handoff::Sent => yielded += 1,
                Handoff::Closed => {
                    // Every worker has exited; nobody is left to take more work.
                    debug!(task_id = %id, yielded, "Task intake closed");
                    return Ok(yielded);
                }
                Handoff::Cancelled => {
                    debug!(task_id = %id, yielded, "Task source stopped by cancellation");
                    return Ok(yielded);
                }
            }
        }

        info!(tasks = yielded, "Task discovery complete");
        Ok(yielded)
    }

    /// Send on the blocking thread, giving up as soon as `cancel` fires.
    fn hand_off(
        runtime: &Handle,
        tx: &mpsc::Sender<TaskDescriptor>,
        cancel: &CancellationToken,
        descriptor: TaskDescriptor,
    ) -> Handoff {
        runtime.block_on(async {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Handoff::Cancelled,
                sent = tx.send(descriptor) => match sent {
                    Ok(()) => Handoff::Sent,
                    Err(_) => Handoff::Closed,
                },
            }
        })
    }
}
