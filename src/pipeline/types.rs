//! Data model shared by the pipeline stages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Positive task identifier. Zero is never a valid id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TaskId(u32);

impl TaskId {
    /// Returns `None` for zero.
    pub fn new(value: u32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Position of this task's expected value (`id - 1`).
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl TryFrom<u32> for TaskId {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        TaskId::new(value).ok_or_else(|| "task id must be positive".to_string())
    }
}

impl From<TaskId> for u32 {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle to a unit of work. Only the executor interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskReference(String);

impl TaskReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A discovered task, as handed from the task source to the worker pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDescriptor {
    pub id: TaskId,
    pub reference: TaskReference,
}

/// Captured output of one successfully executed task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub id: TaskId,
    pub output: String,
}

impl TaskResult {
    /// Build a result from raw executor output, stripping one trailing newline.
    pub fn from_raw(id: TaskId, raw: &[u8]) -> Self {
        let trimmed = raw.strip_suffix(b"\n").unwrap_or(raw);
        Self {
            id,
            output: String::from_utf8_lossy(trimmed).into_owned(),
        }
    }
}

/// Expected outputs, where position `id - 1` belongs to task `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedValues {
    values: Vec<String>,
}

impl ExpectedValues {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    pub fn get(&self, id: TaskId) -> Option<&str> {
        self.values.get(id.index()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExpectedValues {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Comparison outcome for a single task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine {
    pub id: TaskId,
    pub output: String,
    pub expected: String,
    pub matched: bool,
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matched {
            write!(f, "{} correct ({} == {})", self.id, self.output, self.expected)
        } else {
            write!(f, "{} incorrect ({} != {})", self.id, self.output, self.expected)
        }
    }
}

/// Ordered report of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub lines: Vec<ReportLine>,
    pub elapsed: Duration,
}

impl Report {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn passed(&self) -> usize {
        self.lines.iter().filter(|line| line.matched).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.passed()
    }

    pub fn all_matched(&self) -> bool {
        self.lines.iter().all(|line| line.matched)
    }
}
