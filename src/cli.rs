//! CLI domain: parse, route, output, and presentation only.
//! Pipeline orchestration lives in `crate::pipeline`; the route table only wires it up.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_descriptors_json, format_descriptors_text, format_report_json,
    format_report_table, format_report_text,
};
pub use route::{Outcome, RunContext, MISMATCH_EXIT_CODE};
