use std::io;

use chrono::{Local, TimeZone};
use serde_json::{Map, Value};

use super::format::{self, Cell, Table};

const DUPLICATE_PREVIEW_LIMIT: usize = 10;

pub fn render_ingest_run(data: &Value) -> io::Result<String> {
    let dry_run = data
        .get("dry_run")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let summary = data
        .get("summary")
        .and_then(Value::as_object)
        .ok_or_else(|| io::Error::other("ingest output requires summary"))?;

    let mut lines = Vec::new();
    if dry_run {
        lines.push("Dry-run validation completed successfully.".to_string());
    } else {
        lines.push("Ingest completed successfully.".to_string());
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    let mut entries = Vec::new();
    if let Some(ingest_id) = data.get("ingest_id").and_then(Value::as_str) {
        entries.push(("Ingest ID:", ingest_id.to_string()));
    }
    entries.push(("Rows read:", get_i64(summary, "rows_read").to_string()));
    entries.push(("Rows valid:", get_i64(summary, "rows_valid").to_string()));
    entries.push((
        "Rows invalid:",
        get_i64(summary, "rows_invalid").to_string(),
    ));
    entries.push(("Inserted:", get_i64(summary, "inserted").to_string()));
    entries.push(("Deduped:", get_i64(summary, "deduped").to_string()));
    lines.extend(format::key_value_rows(&entries, 2));

    let sources = values(data, "sources");
    if sources.len() > 1 {
        lines.push(String::new());
        lines.push("Per source:".to_string());
        lines.extend(render_source_table(&sources));
    }

    let warnings = render_warnings(data);
    if !warnings.is_empty() {
        lines.push(String::new());
        lines.extend(warnings);
    }

    lines.push(String::new());
    lines.extend(render_skipped_rows(data));
    lines.push(String::new());
    lines.extend(render_duplicates(data));

    lines.push(String::new());
    if dry_run {
        lines.push("No rows were written because this was a dry run.".to_string());
    } else {
        lines.extend(render_ledger_status(data));
    }

    lines.push(String::new());
    lines.extend(render_next_actions(dry_run));

    Ok(lines.join("\n"))
}

pub fn render_history(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("history output requires rows"))?;

    if rows.is_empty() {
        return Ok([
            "No ingests found yet.",
            "",
            "Run your first ingest:",
            "  1. spendfold ingest --help",
            "  2. spendfold ingest --dry-run <paths..>",
            "  3. spendfold ingest <paths..>",
        ]
        .join("\n"));
    }

    let count_label = if rows.len() == 1 {
        "1 ingest found.".to_string()
    } else {
        format!("{} ingests found.", rows.len())
    };

    let mut table = Table::new(&[
        "Ingest ID",
        "Created (local)",
        "Sources",
        "Rows read",
        "Inserted",
        "Deduped",
    ]);
    for row in rows {
        let sources = row
            .get("sources")
            .and_then(Value::as_array)
            .map(|sources| {
                sources
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        table.push(vec![
            Cell::text(value_str(row, "ingest_id")),
            Cell::Text(format_created_local(row)),
            Cell::Text(sources),
            count(row, "rows_read"),
            count(row, "inserted"),
            count(row, "deduped"),
        ]);
    }

    let mut lines = vec![count_label, String::new()];
    lines.extend(table.with_total_row("All ingests").render(format::terminal_width()));
    lines.push(String::new());
    lines.extend(format::key_value_rows(
        &[
            (
                "Ledger rows:",
                data.get("transactions")
                    .and_then(Value::as_u64)
                    .unwrap_or(0)
                    .to_string(),
            ),
            (
                "Ledger file:",
                value_str(data, "ledger_path").to_string(),
            ),
        ],
        0,
    ));
    Ok(lines.join("\n"))
}

fn render_source_table(sources: &[Value]) -> Vec<String> {
    let mut table = Table::new(&["Source", "Read", "Invalid", "Inserted", "Deduped"]);
    for source in sources {
        table.push(vec![
            Cell::text(value_str(source, "source")),
            count(source, "rows_read"),
            count(source, "rows_invalid"),
            count(source, "inserted"),
            count(source, "deduped"),
        ]);
    }
    table.render(format::terminal_width())
}

fn render_warnings(data: &Value) -> Vec<String> {
    let warnings = values(data, "warnings");
    if warnings.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["Warnings:".to_string()];
    for warning in warnings {
        if let Some(message) = warning.get("message").and_then(Value::as_str) {
            lines.push(format!("  {message}"));
        }
    }
    lines
}

/// Every skipped row is listed; nothing is dropped silently.
fn render_skipped_rows(data: &Value) -> Vec<String> {
    let skipped = values(data, "skipped");
    let mut lines = vec![format!("Skipped rows ({}):", skipped.len())];
    if skipped.is_empty() {
        lines.push("  None.".to_string());
        return lines;
    }

    for row in &skipped {
        let record = match value_i64(row, "row") {
            0 => "header".to_string(),
            index => format!("row {index}"),
        };
        let position = match row.get("line").and_then(Value::as_u64) {
            Some(line) => format!("{record} (line {line})"),
            None => record,
        };
        lines.push(format!(
            "  {} {position}: {}",
            value_str(row, "source"),
            value_str(row, "description")
        ));
    }
    lines
}

fn render_duplicates(data: &Value) -> Vec<String> {
    let duplicates = values(data, "duplicates");
    let batch = duplicates
        .iter()
        .filter(|row| value_str(row, "dedupe_reason") == "batch")
        .count();

    let mut lines = vec!["Duplicate Summary:".to_string()];
    lines.extend(format::key_value_rows(
        &[
            ("Total:", duplicates.len().to_string()),
            ("Batch:", batch.to_string()),
            (
                "Existing ledger:",
                (duplicates.len() - batch).to_string(),
            ),
        ],
        2,
    ));
    if duplicates.is_empty() {
        return lines;
    }

    lines.push(String::new());
    if duplicates.len() > DUPLICATE_PREVIEW_LIMIT {
        lines.push(format!(
            "Duplicates Preview (showing first {DUPLICATE_PREVIEW_LIMIT} of {} duplicate rows):",
            duplicates.len()
        ));
    } else {
        lines.push(format!(
            "Duplicates Preview (showing all {} duplicate rows):",
            duplicates.len()
        ));
    }
    let mut table = Table::new(&["Source", "Row", "Date", "Title", "Amount", "Reason"]);
    for row in duplicates.iter().take(DUPLICATE_PREVIEW_LIMIT) {
        table.push(vec![
            Cell::text(value_str(row, "source")),
            count(row, "source_row_index"),
            Cell::text(value_str(row, "date")),
            Cell::text(value_str(row, "title")),
            Cell::amount(row.get("amount").and_then(Value::as_str)),
            Cell::Text(value_str(row, "dedupe_reason").replace('_', " ")),
        ]);
    }
    lines.extend(table.render(format::terminal_width()));
    lines
}

fn render_ledger_status(data: &Value) -> Vec<String> {
    let ledger = data.get("ledger").cloned().unwrap_or(Value::Null);
    let range = ledger.get("data_range").cloned().unwrap_or(Value::Null);
    let covers = match (
        range.get("earliest").and_then(Value::as_str),
        range.get("latest").and_then(Value::as_str),
    ) {
        (Some(earliest), Some(latest)) => format!("{earliest} to {latest}"),
        _ => "no data".to_string(),
    };

    let mut lines = vec!["Ledger now:".to_string()];
    lines.extend(format::key_value_rows(
        &[
            (
                "Transactions:",
                ledger
                    .get("transactions")
                    .and_then(Value::as_u64)
                    .unwrap_or(0)
                    .to_string(),
            ),
            ("Covers:", covers),
        ],
        2,
    ));
    lines
}

fn render_next_actions(dry_run: bool) -> Vec<String> {
    let mut lines = vec!["Next step:".to_string()];
    if dry_run {
        lines.push("  Fix any skipped rows above, then rerun without --dry-run.".to_string());
    } else {
        lines.push("  spendfold report categories".to_string());
    }
    lines
}

fn values(data: &Value, key: &str) -> Vec<Value> {
    data.get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn get_i64(map: &Map<String, Value>, key: &str) -> i64 {
    map.get(key).and_then(Value::as_i64).unwrap_or(0)
}

fn count(row: &Value, key: &str) -> Cell {
    Cell::Count(row.get(key).and_then(Value::as_i64).unwrap_or(0))
}

fn value_i64(row: &Value, key: &str) -> i64 {
    row.get(key).and_then(Value::as_i64).unwrap_or(0)
}

fn value_str<'a>(row: &'a Value, key: &str) -> &'a str {
    row.get(key).and_then(Value::as_str).unwrap_or("")
}

fn format_created_local(row: &Value) -> String {
    let Some(created_at) = row
        .get("created_at")
        .and_then(Value::as_str)
        .and_then(|text| text.parse::<i64>().ok())
    else {
        return "unknown".to_string();
    };
    let Some(local_dt) = Local.timestamp_opt(created_at, 0).single() else {
        return "unknown".to_string();
    };
    local_dt.format("%Y-%m-%d %H:%M:%S %:z").to_string()
}
