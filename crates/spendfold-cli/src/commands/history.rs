use std::path::Path;

use serde::Serialize;
use spendfold_core::CoreResult;
use spendfold_core::contracts::envelope::{SuccessEnvelope, success};

use crate::store::{self, IngestRecord};

#[derive(Debug, Clone, Serialize)]
pub struct HistoryData {
    pub ledger_path: String,
    pub transactions: usize,
    pub rows: Vec<IngestRecord>,
}

/// Committed ingests, newest first.
pub fn run(home_override: Option<&Path>) -> CoreResult<SuccessEnvelope> {
    let home = store::resolve_ledger_home(home_override)?;
    let state = store::load(&home)?;

    let mut rows = state.ingests;
    rows.sort_by(|left, right| {
        created_at_seconds(right)
            .cmp(&created_at_seconds(left))
            .then_with(|| right.ingest_id.cmp(&left.ingest_id))
    });

    success(
        "history",
        HistoryData {
            ledger_path: store::ledger_file_path(&home).display().to_string(),
            transactions: state.ledger.len(),
            rows,
        },
    )
}

fn created_at_seconds(record: &IngestRecord) -> i64 {
    record.created_at.parse::<i64>().unwrap_or(0)
}
