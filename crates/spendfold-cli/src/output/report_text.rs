use std::io;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use super::format::{self, Cell, Table};

pub fn render_report(data: &Value) -> io::Result<String> {
    let view = data
        .get("view")
        .and_then(Value::as_str)
        .ok_or_else(|| io::Error::other("report output requires view"))?;
    let rows = data.get("rows").cloned().unwrap_or(Value::Null);

    let mut lines = vec![window_heading(view_title(view), data.get("window")), String::new()];
    let body = match view {
        "summary" => render_summary(&rows),
        _ => {
            let rows = rows.as_array().cloned().unwrap_or_default();
            if rows.is_empty() {
                lines.push("No expenses in this window.".to_string());
                lines.extend(render_coverage_hint(data.get("window")));
                return Ok(lines.join("\n"));
            }
            let table = match view {
                "category_totals" => category_table(&rows),
                "entity_totals" | "top_entities" => entity_table(&rows),
                "top_transactions" | "pivot" => transaction_table(&rows),
                "monthly_totals" => month_table(&rows),
                "abc_curve" => abc_table(&rows),
                other => {
                    return Err(io::Error::other(format!(
                        "unsupported report view `{other}`"
                    )));
                }
            };
            table.render(format::terminal_width())
        }
    };
    lines.extend(body);
    Ok(lines.join("\n"))
}

pub fn render_export(data: &Value) -> io::Result<String> {
    let meta = data
        .get("meta")
        .ok_or_else(|| io::Error::other("export output requires meta"))?;

    let mut lines = vec![
        "Export completed successfully.".to_string(),
        String::new(),
    ];
    lines.extend(format::key_value_rows(
        &[
            ("Window:", window_span(data.get("window"))),
            ("Records:", value_u64(meta, "transaction_count").to_string()),
            ("Expense rows:", value_u64(data, "expense_rows").to_string()),
            ("Merchants:", value_u64(meta, "unique_entities").to_string()),
            ("Total spent:", money(meta, "total_expenses")),
        ],
        2,
    ));
    lines.push(String::new());
    lines.push("Files written:".to_string());
    lines.push(format!("  {}", value_str(data, "json_path")));
    lines.push(format!("  {}", value_str(data, "csv_path")));
    Ok(lines.join("\n"))
}

fn view_title(view: &str) -> &str {
    match view {
        "category_totals" => "Spending by category",
        "entity_totals" => "Spending by merchant",
        "top_transactions" => "Largest expenses",
        "top_entities" => "Most frequent merchants",
        "pivot" => "Expenses",
        "monthly_totals" => "Spending by month",
        "abc_curve" => "ABC curve",
        "summary" => "Summary",
        other => other,
    }
}

fn window_heading(title: &str, window: Option<&Value>) -> String {
    let horizon = window
        .and_then(|value| value.get("horizon"))
        .and_then(Value::as_str)
        .unwrap_or("");
    format!("{title} ({horizon}: {})", window_span(window))
}

fn window_span(window: Option<&Value>) -> String {
    let start = window
        .and_then(|value| value.get("start"))
        .and_then(Value::as_str);
    let end = window
        .and_then(|value| value.get("end"))
        .and_then(Value::as_str);
    match (start, end) {
        (Some(start), Some(end)) => format!("{start} to {end}"),
        _ => "empty ledger".to_string(),
    }
}

fn render_coverage_hint(window: Option<&Value>) -> Vec<String> {
    let covers = window.and_then(|value| value.get("data_covers"));
    let earliest = covers
        .and_then(|value| value.get("earliest"))
        .and_then(Value::as_str);
    let latest = covers
        .and_then(|value| value.get("latest"))
        .and_then(Value::as_str);
    match (earliest, latest) {
        (Some(earliest), Some(latest)) => vec![
            String::new(),
            format!("Ledger data covers {earliest} to {latest}."),
        ],
        _ => vec![
            String::new(),
            "The ledger is empty. Run `spendfold ingest <paths..>` first.".to_string(),
        ],
    }
}

fn render_summary(summary: &Value) -> Vec<String> {
    let span = match (
        summary.get("first_date").and_then(Value::as_str),
        summary.get("last_date").and_then(Value::as_str),
    ) {
        (Some(first), Some(last)) => format!("{first} to {last}"),
        _ => "none".to_string(),
    };
    format::key_value_rows(
        &[
            ("Total spent:", money(summary, "total_expenses")),
            (
                "Expenses:",
                value_u64(summary, "transaction_count").to_string(),
            ),
            (
                "Merchants:",
                value_u64(summary, "unique_entities").to_string(),
            ),
            (
                "Months with data:",
                value_u64(summary, "months_with_data").to_string(),
            ),
            ("Average / month:", money(summary, "average_per_month")),
            ("Average / week:", money(summary, "average_per_week")),
            ("Expense dates:", span),
        ],
        2,
    )
}

fn category_table(rows: &[Value]) -> Table {
    let mut table = Table::new(&["Category", "Total", "Count"]);
    for row in rows {
        table.push(vec![
            Cell::text(value_str(row, "category")),
            amount(row, "total"),
            count(row, "count"),
        ]);
    }
    table.with_total_row("Total")
}

fn entity_table(rows: &[Value]) -> Table {
    let mut table = Table::new(&["Merchant", "Total", "Count"]);
    for row in rows {
        table.push(vec![
            Cell::text(value_str(row, "title")),
            amount(row, "total"),
            count(row, "count"),
        ]);
    }
    table
}

fn transaction_table(rows: &[Value]) -> Table {
    let mut table = Table::new(&["Date", "Title", "Amount", "Category"]);
    for row in rows {
        table.push(vec![
            Cell::text(value_str(row, "date")),
            Cell::text(value_str(row, "title")),
            amount(row, "amount"),
            Cell::text(row.get("category").and_then(Value::as_str).unwrap_or("-")),
        ]);
    }
    table
}

fn month_table(rows: &[Value]) -> Table {
    let mut table = Table::new(&["Month", "Total", "Count", "Over budget"]);
    for row in rows {
        table.push(vec![
            Cell::text(value_str(row, "month")),
            amount(row, "total"),
            count(row, "count"),
            amount(row, "over_budget"),
        ]);
    }
    table.with_total_row("Total")
}

fn abc_table(rows: &[Value]) -> Table {
    let mut table = Table::new(&["Merchant", "Total", "Cumulative", "Class"]);
    for row in rows {
        table.push(vec![
            Cell::text(value_str(row, "title")),
            amount(row, "total"),
            Cell::Percent(
                row.get("cumulative_pct")
                    .and_then(Value::as_str)
                    .and_then(|text| Decimal::from_str(text).ok()),
            ),
            Cell::text(value_str(row, "class")),
        ]);
    }
    table
}

fn amount(row: &Value, key: &str) -> Cell {
    Cell::amount(row.get(key).and_then(Value::as_str))
}

fn count(row: &Value, key: &str) -> Cell {
    Cell::Count(row.get(key).and_then(Value::as_i64).unwrap_or(0))
}

fn money(row: &Value, key: &str) -> String {
    row.get(key)
        .and_then(Value::as_str)
        .and_then(|text| Decimal::from_str(text).ok())
        .map(format::format_amount)
        .unwrap_or_else(|| "-".to_string())
}

fn value_str<'a>(row: &'a Value, key: &str) -> &'a str {
    row.get(key).and_then(Value::as_str).unwrap_or("")
}

fn value_u64(row: &Value, key: &str) -> u64 {
    row.get(key).and_then(Value::as_u64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{render_export, render_report};

    fn window() -> serde_json::Value {
        json!({
            "horizon": "12m",
            "start": "2023-07-01",
            "end": "2024-06-30",
            "reference": null,
            "rows": 4,
            "data_covers": {"earliest": "2023-07-03", "latest": "2024-06-30"}
        })
    }

    #[test]
    fn category_view_renders_a_table() {
        let data = json!({
            "window": window(),
            "view": "category_totals",
            "rows": [
                {"category": "Transporte", "total": "1120.50", "count": 3},
                {"category": "uncategorized", "total": "10.00", "count": 1}
            ]
        });

        let rendered = render_report(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("Spending by category (12m: 2023-07-01 to 2024-06-30)"));
            assert!(text.contains("Transporte"));
            assert!(text.contains("1,120.50"));
            assert!(text.contains("  Total          1,130.00      4"));
        }
    }

    #[test]
    fn empty_view_mentions_ledger_coverage() {
        let data = json!({"window": window(), "view": "pivot", "rows": []});
        let rendered = render_report(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.contains("No expenses in this window."));
            assert!(text.contains("Ledger data covers 2023-07-03 to 2024-06-30."));
        }
    }

    #[test]
    fn summary_view_renders_key_values() {
        let data = json!({
            "window": window(),
            "view": "summary",
            "rows": {
                "total_expenses": "520.00",
                "transaction_count": 4,
                "unique_entities": 3,
                "months_with_data": 2,
                "average_per_month": "260.00",
                "average_per_week": "10.00",
                "first_date": "2024-05-01",
                "last_date": "2024-06-30"
            }
        });
        let rendered = render_report(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.contains("Average / month:"));
            assert!(text.contains("2024-05-01 to 2024-06-30"));
        }
    }

    #[test]
    fn export_lists_written_files() {
        let data = json!({
            "json_path": "out/consolidated.json",
            "csv_path": "out/consolidated_expenses.csv",
            "expense_rows": 4,
            "window": window(),
            "meta": {"transaction_count": 5, "unique_entities": 3, "total_expenses": "520.00"}
        });
        let rendered = render_export(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.contains("out/consolidated.json"));
            assert!(text.contains("out/consolidated_expenses.csv"));
        }
    }
}
