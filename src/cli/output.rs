//! CLI output: error mapping from pipeline errors to a stable CLI surface.

use crate::error::ValidateError;

/// Map a fatal error to the message printed on stderr.
pub fn map_error(e: &ValidateError) -> String {
    match e {
        ValidateError::Cancelled => "Validation cancelled; no report produced".to_string(),
        other => format!("Error: {}", other),
    }
}
