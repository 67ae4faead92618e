use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use spendfold_core::contracts::envelope::{SuccessEnvelope, success};
use spendfold_core::contracts::types::{
    DataRange, DuplicateRow, IngestTotals, IngestWarning, SkippedRow, SourceSummary,
};
use spendfold_core::ingest::{IngestSource, ingest};
use spendfold_core::{CoreError, CoreResult};
use tracing::info;
use ulid::Ulid;

use crate::rules::load_rules;
use crate::store::{self, IngestRecord};

#[derive(Debug, Default)]
pub struct IngestRunOptions<'a> {
    pub paths: &'a [PathBuf],
    pub dry_run: bool,
    pub rules_path: Option<&'a Path>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerStatus {
    pub transactions: usize,
    pub data_range: DataRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestData {
    pub dry_run: bool,
    pub ingest_id: Option<String>,
    pub message: String,
    pub summary: IngestTotals,
    pub sources: Vec<SourceSummary>,
    pub skipped: Vec<SkippedRow>,
    pub duplicates: Vec<DuplicateRow>,
    pub warnings: Vec<IngestWarning>,
    pub ledger: LedgerStatus,
}

pub fn run(options: IngestRunOptions<'_>) -> CoreResult<SuccessEnvelope> {
    let home = store::resolve_ledger_home(options.home_override)?;
    let rules = load_rules(options.rules_path)?;
    let sources = read_sources(options.paths)?;
    let mut state = store::load(&home)?;

    let ledger = std::mem::take(&mut state.ledger);
    let outcome = ingest(ledger, &sources);
    let summary = outcome.totals();
    state.ledger = outcome.ledger.recategorize(&rules);

    let ingest_id = if options.dry_run {
        None
    } else {
        let ingest_id = format!("ing_{}", Ulid::new());
        state.ingests.push(IngestRecord {
            ingest_id: ingest_id.clone(),
            created_at: Utc::now().timestamp().to_string(),
            sources: sources.iter().map(|source| source.name.clone()).collect(),
            rows_read: summary.rows_read,
            rows_invalid: summary.rows_invalid,
            inserted: summary.inserted,
            deduped: summary.deduped,
        });
        store::save(&home, &state)?;
        info!(ingest_id = %ingest_id, inserted = summary.inserted, "committed ingest");
        Some(ingest_id)
    };

    let message = if options.dry_run {
        "Validation finished. No rows were written.".to_string()
    } else {
        "Ingest completed.".to_string()
    };

    success(
        "ingest",
        IngestData {
            dry_run: options.dry_run,
            ingest_id,
            message,
            summary,
            sources: outcome.sources,
            skipped: outcome.skipped,
            duplicates: outcome.duplicates,
            warnings: outcome.warnings,
            ledger: LedgerStatus {
                transactions: state.ledger.len(),
                data_range: state.ledger.data_range(),
            },
        },
    )
}

fn read_sources(paths: &[PathBuf]) -> CoreResult<Vec<IngestSource>> {
    paths
        .iter()
        .map(|path| {
            let text = fs::read_to_string(path)
                .map_err(|error| CoreError::source_read_failed(path, &error.to_string()))?;
            Ok(IngestSource::new(&path.display().to_string(), &text))
        })
        .collect()
}
