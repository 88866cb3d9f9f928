//! CLI presentation: text, table and json formatters per command.

mod listing;
mod report;

pub use listing::{format_descriptors_json, format_descriptors_text};
pub use report::{format_report_json, format_report_table, format_report_text};
