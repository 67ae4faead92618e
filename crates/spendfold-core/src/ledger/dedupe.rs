use std::collections::HashMap;

use tracing::info;

use crate::ledger::Ledger;
use crate::transaction::{IdentityKey, Transaction};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DedupeReason {
    Batch,
    ExistingLedger,
}

impl DedupeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Batch => "batch",
            Self::ExistingLedger => "existing_ledger",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DuplicateRecord {
    pub row: Transaction,
    pub batch_index: i64,
    pub dedupe_reason: DedupeReason,
    pub matched_batch_index: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub incoming: i64,
    pub inserted: i64,
    pub duplicates: Vec<DuplicateRecord>,
}

impl MergeReport {
    pub fn deduped(&self) -> i64 {
        self.duplicates.len() as i64
    }
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub ledger: Ledger,
    pub report: MergeReport,
}

/// Merges a normalized batch into the ledger by identity key.
///
/// Keys already in the ledger keep the ledger's row; repeated keys inside
/// the batch keep their first occurrence. Appends only, in batch order.
pub fn merge(ledger: Ledger, batch: Vec<Transaction>) -> MergeOutcome {
    let mut ledger = ledger;
    let mut batch_seen: HashMap<IdentityKey, i64> = HashMap::new();
    let mut report = MergeReport {
        incoming: batch.len() as i64,
        ..MergeReport::default()
    };

    for (index, row) in batch.into_iter().enumerate() {
        let batch_index = (index as i64) + 1;
        let key = row.identity_key();

        if ledger.contains_key(&key) {
            let matched_batch_index = batch_seen.get(&key).copied();
            let dedupe_reason = if matched_batch_index.is_some() {
                DedupeReason::Batch
            } else {
                DedupeReason::ExistingLedger
            };
            report.duplicates.push(DuplicateRecord {
                row,
                batch_index,
                dedupe_reason,
                matched_batch_index,
            });
            continue;
        }

        batch_seen.insert(key.clone(), batch_index);
        ledger.insert_unique(key, row);
        report.inserted += 1;
    }

    info!(
        incoming = report.incoming,
        inserted = report.inserted,
        deduped = report.deduped(),
        ledger_size = ledger.len(),
        "merged batch into ledger"
    );
    MergeOutcome { ledger, report }
}
