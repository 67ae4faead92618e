use serde_json::Value;
use spendfold_core::CoreError;

use super::format;

/// Context keys from the error payload worth showing a human, in order.
const DETAIL_KEYS: [(&str, &str); 4] = [
    ("path", "File:"),
    ("field", "Field:"),
    ("received", "Received:"),
    ("supported_horizons", "Supported:"),
];

pub fn render_error(error: &CoreError) -> String {
    let mut lines = vec![
        format!("{} ({})", headline(&error.code), error.code),
        format!("  {}", error.message),
    ];

    let details = error
        .data
        .as_ref()
        .map(detail_entries)
        .unwrap_or_default();
    if !details.is_empty() {
        lines.push(String::new());
        let borrowed = details
            .iter()
            .map(|(label, value)| (*label, value.clone()))
            .collect::<Vec<(&str, String)>>();
        lines.extend(format::key_value_rows(&borrowed, 2));
    }

    lines.push(String::new());
    lines.push("Next steps:".to_string());
    if error.recovery_steps.is_empty() {
        lines.push("  1. Rerun with SPENDFOLD_LOG=debug and report the output.".to_string());
    } else {
        for (index, step) in error.recovery_steps.iter().enumerate() {
            lines.push(format!("  {}. {step}", index + 1));
        }
    }

    lines.join("\n")
}

fn headline(code: &str) -> &'static str {
    match code {
        "invalid_argument" | "invalid_top_n" | "invalid_range" => "The request was not understood",
        "invalid_rule_set" => "The category rules could not be used",
        "source_read_failed" => "An export file could not be read",
        "ledger_read_failed" | "ledger_corrupt" => "The ledger could not be loaded",
        "ledger_write_failed" => "The ledger could not be saved",
        "export_failed" => "The consolidated files could not be written",
        _ => "spendfold hit an internal error",
    }
}

fn detail_entries(data: &Value) -> Vec<(&'static str, String)> {
    DETAIL_KEYS
        .iter()
        .filter_map(|(key, label)| {
            let value = match data.get(*key)? {
                Value::String(text) => format!("\"{text}\""),
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<&str>>()
                    .join(", "),
                Value::Null => return None,
                other => other.to_string(),
            };
            Some((*label, value))
        })
        .collect()
}
