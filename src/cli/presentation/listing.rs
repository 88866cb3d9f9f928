//! Descriptor listing for `verdict list`.

use crate::error::ValidateError;
use crate::pipeline::TaskDescriptor;

pub fn format_descriptors_text(descriptors: &[TaskDescriptor]) -> String {
    if descriptors.is_empty() {
        return "No tasks found.".to_string();
    }
    let mut lines = vec![format!("Tasks ({}):", descriptors.len())];
    lines.extend(
        descriptors
            .iter()
            .map(|d| format!("  {:03}  {}", d.id.get(), d.reference)),
    );
    lines.join("\n")
}

pub fn format_descriptors_json(descriptors: &[TaskDescriptor]) -> Result<String, ValidateError> {
    let tasks: Vec<serde_json::Value> = descriptors
        .iter()
        .map(|d| serde_json::json!({ "id": d.id.get(), "reference": d.reference.as_str() }))
        .collect();
    let out = serde_json::json!({ "count": tasks.len(), "tasks": tasks });
    serde_json::to_string_pretty(&out)
        .map_err(|e| ValidateError::Runtime(format!("Failed to serialize task list: {}", e)))
}
