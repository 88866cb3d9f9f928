//! Report formatters for `verdict run`.

use crate::error::ValidateError;
use crate::pipeline::{Report, ReportLine};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;

/// One `Problem NNN: ...` line per task, then the elapsed time.
pub fn format_report_text(report: &Report, color: bool) -> String {
    let mut out: Vec<String> = report
        .lines
        .iter()
        .map(|line| format_line(line, color))
        .collect();
    out.push(format!("Completed in: {:?}", report.elapsed));
    out.join("\n")
}

fn format_line(line: &ReportLine, color: bool) -> String {
    let (verdict, operator) = if line.matched {
        ("correct", "==")
    } else {
        ("incorrect", "!=")
    };
    let verdict = match (color, line.matched) {
        (false, _) => verdict.to_string(),
        (true, true) => verdict.green().to_string(),
        (true, false) => verdict.red().bold().to_string(),
    };
    format!(
        "Problem {:03}: Output is {} '{} {} {}'",
        line.id.get(),
        verdict,
        line.output,
        operator,
        line.expected
    )
}

pub fn format_report_table(report: &Report) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Task", "Result", "Output", "Expected"]);
    for line in &report.lines {
        table.add_row(vec![
            format!("{:03}", line.id.get()),
            if line.matched { "correct" } else { "incorrect" }.to_string(),
            line.output.clone(),
            line.expected.clone(),
        ]);
    }
    format!(
        "{}\n{} passed, {} failed in {:?}",
        table,
        report.passed(),
        report.failed(),
        report.elapsed
    )
}

#[derive(Serialize)]
struct ReportOutput<'a> {
    generated_at: String,
    elapsed_ms: u64,
    passed: usize,
    failed: usize,
    lines: &'a [ReportLine],
}

pub fn format_report_json(report: &Report) -> Result<String, ValidateError> {
    let out = ReportOutput {
        generated_at: chrono::Utc::now().to_rfc3339(),
        elapsed_ms: u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
        passed: report.passed(),
        failed: report.failed(),
        lines: &report.lines,
    };
    serde_json::to_string_pretty(&out)
        .map_err(|e| ValidateError::Runtime(format!("Failed to serialize report: {}", e)))
}
