pub mod normalize;
pub mod parse;

use tracing::{info, warn};

use crate::contracts::types::{
    DuplicateRow, IngestTotals, IngestWarning, SkippedRow, SourceSummary,
};
use crate::ledger::{Ledger, MergeReport, merge};
use crate::transaction::Transaction;
use crate::window::date::format_iso_date;

pub use normalize::normalize;
pub use parse::{EXPORT_HEADERS, ParseOutcome, ParsedRecord, parse, parse_amount};

/// One raw export and the name it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSource {
    pub name: String,
    pub text: String,
}

impl IngestSource {
    pub fn new(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub ledger: Ledger,
    pub sources: Vec<SourceSummary>,
    pub skipped: Vec<SkippedRow>,
    pub duplicates: Vec<DuplicateRow>,
    pub warnings: Vec<IngestWarning>,
}

impl IngestOutcome {
    pub fn totals(&self) -> IngestTotals {
        self.sources
            .iter()
            .fold(IngestTotals::default(), |mut totals, source| {
                totals.rows_read += source.rows_read;
                totals.rows_valid += source.rows_valid;
                totals.rows_invalid += source.rows_invalid;
                totals.inserted += source.inserted;
                totals.deduped += source.deduped;
                totals
            })
    }
}

struct BatchOrigin {
    source_index: usize,
    row: i64,
}

/// Runs parse and normalize over every source, then merges all of them
/// into `ledger` as one batch in source order.
///
/// Partial failures never abort: bad rows come back in `skipped`, and a
/// source with no valid rows only adds an `empty_input` warning.
pub fn ingest(ledger: Ledger, sources: &[IngestSource]) -> IngestOutcome {
    let mut summaries = Vec::with_capacity(sources.len());
    let mut skipped = Vec::new();
    let mut warnings = Vec::new();
    let mut batch: Vec<Transaction> = Vec::new();
    let mut origins: Vec<BatchOrigin> = Vec::new();

    for (source_index, source) in sources.iter().enumerate() {
        let parsed = parse(&source.text);
        let rows_invalid = parsed.rows_invalid();
        let rows_valid = parsed.records.len() as i64;

        if parsed.records.is_empty() {
            warn!(source = %source.name, rows_read = parsed.rows_read, "source yielded no valid records");
            warnings.push(empty_input_warning(&source.name, parsed.rows_read));
        }

        skipped.extend(parsed.failures.into_iter().map(|failure| SkippedRow {
            source: source.name.clone(),
            failure,
        }));
        origins.extend(parsed.records.iter().map(|record| BatchOrigin {
            source_index,
            row: record.row,
        }));
        batch.extend(normalize(parsed.records));

        summaries.push(SourceSummary {
            source: source.name.clone(),
            rows_read: parsed.rows_read,
            rows_valid,
            rows_invalid,
            inserted: 0,
            deduped: 0,
        });
    }

    let merged = merge(ledger, batch);
    let duplicates = attribute_duplicates(&merged.report, &origins, sources, &mut summaries);

    info!(
        sources = sources.len(),
        skipped = skipped.len(),
        inserted = merged.report.inserted,
        deduped = merged.report.deduped(),
        "ingest finished"
    );
    IngestOutcome {
        ledger: merged.ledger,
        sources: summaries,
        skipped,
        duplicates,
        warnings,
    }
}

fn attribute_duplicates(
    report: &MergeReport,
    origins: &[BatchOrigin],
    sources: &[IngestSource],
    summaries: &mut [SourceSummary],
) -> Vec<DuplicateRow> {
    let mut duplicates = Vec::with_capacity(report.duplicates.len());
    for duplicate in &report.duplicates {
        let position = (duplicate.batch_index - 1) as usize;
        let Some(origin) = origins.get(position) else {
            continue;
        };
        summaries[origin.source_index].deduped += 1;
        duplicates.push(DuplicateRow {
            source: sources[origin.source_index].name.clone(),
            source_row_index: origin.row,
            dedupe_reason: duplicate.dedupe_reason.as_str().to_string(),
            date: format_iso_date(&duplicate.row.date),
            title: duplicate.row.title.clone(),
            amount: duplicate.row.amount.to_string(),
        });
    }

    for summary in summaries.iter_mut() {
        summary.inserted = summary.rows_valid - summary.deduped;
    }
    duplicates
}

fn empty_input_warning(source: &str, rows_read: i64) -> IngestWarning {
    let message = if rows_read == 0 {
        format!("`{source}` contained no data rows.")
    } else {
        format!("`{source}` had {rows_read} row(s) but none were valid.")
    };
    IngestWarning {
        code: "empty_input".to_string(),
        message,
    }
}
