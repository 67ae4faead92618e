use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::contracts::types::RowFailure;
use crate::window::date::parse_export_date;

pub const EXPORT_HEADERS: [&str; 3] = ["date", "title", "amount"];

const EXPECTED_DATE: &str = "YYYY-MM-DD or DD/MM/YYYY";
const EXPECTED_AMOUNT: &str = "signed decimal (e.g. 23.50 or -450,00)";

/// Largest magnitude accepted for a single row.
pub const MAX_ABS_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0); // 1_000_000_000_000

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    pub row: i64,
    pub date: NaiveDate,
    pub title: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub records: Vec<ParsedRecord>,
    pub failures: Vec<RowFailure>,
    pub rows_read: i64,
}

impl ParseOutcome {
    pub fn rows_invalid(&self) -> i64 {
        self.failures
            .iter()
            .map(|failure| failure.row)
            .collect::<HashSet<i64>>()
            .len() as i64
    }
}

/// Parses one `date,title,amount` export. Bad rows are reported in
/// `failures` and never abort the rest of the file.
pub fn parse(raw_text: &str) -> ParseOutcome {
    let content = raw_text.trim_start_matches('\u{feff}');
    if content.trim().is_empty() {
        return ParseOutcome::default();
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = match reader.headers() {
        Ok(record) => record
            .iter()
            .map(|value| value.trim().to_lowercase())
            .collect::<Vec<String>>(),
        Err(error) => {
            return schema_failure(&format!("CSV header row is unreadable: {error}"), None);
        }
    };

    let Some(columns) = column_positions(&headers) else {
        return schema_failure(
            "CSV header must be exactly `date,title,amount`.",
            Some(headers.join(",")),
        );
    };

    let mut outcome = ParseOutcome::default();
    for (row_index, result_row) in reader.records().enumerate() {
        let row = (row_index as i64) + 1;
        outcome.rows_read += 1;

        let record = match result_row {
            Ok(record) => record,
            Err(error) => {
                outcome.failures.push(RowFailure {
                    row,
                    line: error.position().map(csv::Position::line),
                    field: None,
                    code: "malformed_row".to_string(),
                    description: format!("Row could not be read: {error}"),
                    expected: None,
                    received: None,
                });
                continue;
            }
        };

        let line = record.position().map(csv::Position::line);
        if record.len() != EXPORT_HEADERS.len() {
            outcome.failures.push(RowFailure {
                row,
                line,
                field: None,
                code: "wrong_column_count".to_string(),
                description: format!(
                    "Row has {} columns; exports have exactly {}.",
                    record.len(),
                    EXPORT_HEADERS.len()
                ),
                expected: Some(EXPORT_HEADERS.len().to_string()),
                received: Some(record.len().to_string()),
            });
            continue;
        }

        let mut row_failures = Vec::new();
        let date = validate_date(row, record.get(columns.date), &mut row_failures);
        let title = validate_title(row, record.get(columns.title), &mut row_failures);
        let amount = validate_amount(row, record.get(columns.amount), &mut row_failures);

        match (date, title, amount) {
            (Some(date), Some(title), Some(amount)) if row_failures.is_empty() => {
                outcome.records.push(ParsedRecord {
                    row,
                    date,
                    title,
                    amount,
                });
            }
            _ => outcome
                .failures
                .extend(row_failures.into_iter().map(|failure| RowFailure { line, ..failure })),
        }
    }

    if !outcome.failures.is_empty() {
        warn!(
            rows_read = outcome.rows_read,
            rows_invalid = outcome.rows_invalid(),
            "skipped malformed export rows"
        );
    }
    debug!(
        rows_read = outcome.rows_read,
        rows_valid = outcome.records.len(),
        "parsed export"
    );
    outcome
}

#[derive(Debug, Clone, Copy)]
struct ColumnPositions {
    date: usize,
    title: usize,
    amount: usize,
}

fn column_positions(headers: &[String]) -> Option<ColumnPositions> {
    if headers.len() != EXPORT_HEADERS.len() {
        return None;
    }
    let index_by_name = headers
        .iter()
        .enumerate()
        .map(|(index, name)| (name.as_str(), index))
        .collect::<HashMap<&str, usize>>();

    Some(ColumnPositions {
        date: *index_by_name.get("date")?,
        title: *index_by_name.get("title")?,
        amount: *index_by_name.get("amount")?,
    })
}

fn schema_failure(description: &str, received: Option<String>) -> ParseOutcome {
    warn!("export header does not match date,title,amount");
    ParseOutcome {
        records: Vec::new(),
        failures: vec![RowFailure {
            row: 0,
            line: Some(1),
            field: None,
            code: "schema_mismatch".to_string(),
            description: description.to_string(),
            expected: Some(EXPORT_HEADERS.join(",")),
            received,
        }],
        rows_read: 0,
    }
}

fn validate_date(
    row: i64,
    value: Option<&str>,
    failures: &mut Vec<RowFailure>,
) -> Option<NaiveDate> {
    let Some(candidate) = non_empty(value) else {
        failures.push(missing_field(row, "date", EXPECTED_DATE));
        return None;
    };

    let parsed = parse_export_date(candidate);
    if parsed.is_none() {
        failures.push(RowFailure {
            row,
            line: None,
            field: Some("date".to_string()),
            code: "invalid_date".to_string(),
            description: format!("date must be a real calendar date; got \"{candidate}\""),
            expected: Some(EXPECTED_DATE.to_string()),
            received: Some(candidate.to_string()),
        });
    }
    parsed
}

fn validate_title(
    row: i64,
    value: Option<&str>,
    failures: &mut Vec<RowFailure>,
) -> Option<String> {
    let Some(candidate) = non_empty(value) else {
        failures.push(missing_field(row, "title", "non-empty text"));
        return None;
    };
    Some(candidate.to_string())
}

fn validate_amount(
    row: i64,
    value: Option<&str>,
    failures: &mut Vec<RowFailure>,
) -> Option<Decimal> {
    let Some(candidate) = non_empty(value) else {
        failures.push(missing_field(row, "amount", EXPECTED_AMOUNT));
        return None;
    };

    let parsed = parse_amount(candidate);
    if parsed.is_none() {
        let description = if parse_decimal_text(candidate).is_some() {
            format!("amount is outside +/-{MAX_ABS_AMOUNT}; got \"{candidate}\"")
        } else {
            format!("amount must be numeric; got \"{candidate}\"")
        };
        failures.push(RowFailure {
            row,
            line: None,
            field: Some("amount".to_string()),
            code: "invalid_number".to_string(),
            description,
            expected: Some(EXPECTED_AMOUNT.to_string()),
            received: Some(candidate.to_string()),
        });
    }
    parsed
}

/// Reads a signed amount written with a dot or comma decimal separator.
/// When both appear, the right-most one is the decimal separator.
/// Magnitudes above [`MAX_ABS_AMOUNT`] are rejected.
pub fn parse_amount(value: &str) -> Option<Decimal> {
    parse_decimal_text(value).filter(|amount| amount.abs() <= MAX_ABS_AMOUNT)
}

fn parse_decimal_text(value: &str) -> Option<Decimal> {
    let trimmed = value.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed).trim_start()),
    };

    if unsigned.is_empty()
        || !unsigned
            .chars()
            .all(|character| character.is_ascii_digit() || character == '.' || character == ',')
        || !unsigned.chars().any(|character| character.is_ascii_digit())
    {
        return None;
    }

    let canonical = canonical_decimal_text(unsigned)?;
    let magnitude = Decimal::from_str(&canonical).ok()?;
    if negative {
        return Some(-magnitude);
    }
    Some(magnitude)
}

fn canonical_decimal_text(unsigned: &str) -> Option<String> {
    let separator = match (unsigned.rfind('.'), unsigned.rfind(',')) {
        (Some(dot), Some(comma)) => {
            if dot > comma {
                '.'
            } else {
                ','
            }
        }
        (Some(_), None) => '.',
        (None, Some(_)) => ',',
        (None, None) => return Some(unsigned.to_string()),
    };
    let grouping = if separator == '.' { ',' } else { '.' };
    let ungrouped = unsigned.replace(grouping, "");
    if ungrouped.matches(separator).count() > 1 {
        return None;
    }
    Some(ungrouped.replace(separator, "."))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed)
}

fn missing_field(row: i64, field: &str, expected: &str) -> RowFailure {
    RowFailure {
        row,
        line: None,
        field: Some(field.to_string()),
        code: "missing_required_field".to_string(),
        description: format!("{field} must be present and non-empty."),
        expected: Some(expected.to_string()),
        received: Some(String::new()),
    }
}
