//! Result collector: buffers the unordered result stream, restores id order and
//! compares each output to its expected value.
//!
//! Ordering is restored with a stable sort over the buffered results rather than a
//! slot array indexed by id, which would need to be sized to the largest id up front.

use crate::error::ValidateError;
use crate::pipeline::types::{ExpectedValues, ReportLine, TaskResult};
use tokio::sync::mpsc;
use tracing::debug;

/// Buffer results until the worker pool closes its stream.
pub async fn drain(mut results: mpsc::Receiver<TaskResult>) -> Vec<TaskResult> {
    let mut buffered = Vec::new();
    while let Some(result) = results.recv().await {
        buffered.push(result);
    }
    debug!(results = buffered.len(), "Result stream closed");
    buffered
}

/// Sort results by ascending id and compare them against `expected`.
///
/// A result whose id has no expected value aborts collection with
/// [`ValidateError::IndexOutOfRange`]; it is never reported as a mismatch.
pub fn collect(
    mut results: Vec<TaskResult>,
    expected: &ExpectedValues,
) -> Result<Vec<ReportLine>, ValidateError> {
    results.sort_by_key(|result| result.id);

    results
        .into_iter()
        .map(|result| {
            let expected_value = expected.get(result.id).ok_or(ValidateError::IndexOutOfRange {
                id: result.id,
                len: expected.len(),
            })?;

            Ok(ReportLine {
                id: result.id,
                matched: result.output == expected_value,
                expected: expected_value.to_string(),
                output: result.output,
            })
        })
        .collect()
}
