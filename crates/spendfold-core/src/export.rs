use std::collections::HashSet;
use std::io::Write;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::aggregate::totals::spending_total;
use crate::transaction::Transaction;
use crate::window::WindowSelection;
use crate::{CoreError, CoreResult};

pub const EXPENSES_CSV_HEADERS: [&str; 4] = ["date", "title", "amount", "category"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportMeta {
    pub horizon: String,
    pub reference: Option<NaiveDate>,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub total_expenses: Decimal,
    pub transaction_count: usize,
    pub expense_count: usize,
    pub unique_entities: usize,
}

/// Structured record set for bulk loading elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsolidatedExport {
    pub meta: ExportMeta,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize)]
struct ExpenseCsvRow<'a> {
    date: NaiveDate,
    title: &'a str,
    amount: Decimal,
    category: &'a str,
}

/// Builds the export from an already categorized window. Rows are ordered
/// by date, then title, then amount.
pub fn consolidated_export(selection: &WindowSelection) -> ConsolidatedExport {
    let mut transactions = selection.transactions.clone();
    transactions.sort_by(|left, right| {
        left.date
            .cmp(&right.date)
            .then_with(|| left.title.cmp(&right.title))
            .then_with(|| left.amount.cmp(&right.amount))
    });

    let spending_rows = transactions
        .iter()
        .filter(|row| row.counts_as_spending())
        .collect::<Vec<&Transaction>>();
    let meta = ExportMeta {
        horizon: selection.horizon.label(),
        reference: selection.reference,
        window_start: selection.range.map(|range| range.start),
        window_end: selection.range.map(|range| range.end),
        total_expenses: spending_total(&transactions),
        transaction_count: transactions.len(),
        expense_count: spending_rows.len(),
        unique_entities: spending_rows
            .iter()
            .map(|row| row.entity.as_str())
            .collect::<HashSet<&str>>()
            .len(),
    };

    ConsolidatedExport { meta, transactions }
}

pub fn write_export_json<W: Write>(export: &ConsolidatedExport, writer: W) -> CoreResult<()> {
    serde_json::to_writer_pretty(writer, export)
        .map_err(|error| CoreError::export_failed(&error.to_string()))
}

/// Writes the flat `date,title,amount,category` table. Rows follow the
/// same spending rule as `ExportMeta::expense_count`.
pub fn write_expenses_csv<W: Write>(records: &[Transaction], writer: W) -> CoreResult<usize> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer
        .write_record(EXPENSES_CSV_HEADERS)
        .map_err(|error| CoreError::export_failed(&error.to_string()))?;

    let mut written = 0_usize;
    for row in records.iter().filter(|row| row.counts_as_spending()) {
        csv_writer
            .serialize(ExpenseCsvRow {
                date: row.date,
                title: &row.title,
                amount: row.amount,
                category: row.category_label(),
            })
            .map_err(|error| CoreError::export_failed(&error.to_string()))?;
        written += 1;
    }
    csv_writer
        .flush()
        .map_err(|error| CoreError::export_failed(&error.to_string()))?;

    debug!(rows = written, "wrote expenses table");
    Ok(written)
}
