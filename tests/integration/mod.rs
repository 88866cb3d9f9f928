//! Integration tests for the verdict validation pipeline

mod cancellation;
mod directory_run;
mod pipeline_ordering;
