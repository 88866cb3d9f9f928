//! Property-based tests for report determinism
