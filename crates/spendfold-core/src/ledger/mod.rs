pub mod dedupe;

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::categorize::{RuleSet, categorize};
use crate::contracts::types::DataRange;
use crate::transaction::{IdentityKey, Transaction};
use crate::window::date::format_iso_date;

pub use dedupe::{DedupeReason, DuplicateRecord, MergeOutcome, MergeReport, merge};

/// Every transaction seen so far, unique by identity key, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "LedgerSnapshot", into = "LedgerSnapshot")]
pub struct Ledger {
    transactions: Vec<Transaction>,
    keys: HashSet<IdentityKey>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from rows of unknown provenance, keeping the first
    /// row for each identity key.
    pub fn from_transactions(rows: Vec<Transaction>) -> Self {
        let mut ledger = Self::new();
        for row in rows {
            let key = row.identity_key();
            if ledger.contains_key(&key) {
                continue;
            }
            ledger.insert_unique(key, row);
        }
        ledger
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn contains_key(&self, key: &IdentityKey) -> bool {
        self.keys.contains(key)
    }

    pub fn identity_keys(&self) -> &HashSet<IdentityKey> {
        &self.keys
    }

    pub fn earliest_date(&self) -> Option<NaiveDate> {
        self.transactions.iter().map(|row| row.date).min()
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.transactions.iter().map(|row| row.date).max()
    }

    pub fn data_range(&self) -> DataRange {
        DataRange {
            earliest: self.earliest_date().as_ref().map(format_iso_date),
            latest: self.latest_date().as_ref().map(format_iso_date),
        }
    }

    /// Re-runs categorization over every row; keys and order are unchanged.
    pub fn recategorize(self, rules: &RuleSet) -> Self {
        Self {
            transactions: categorize(self.transactions, rules),
            keys: self.keys,
        }
    }

    pub(crate) fn insert_unique(&mut self, key: IdentityKey, row: Transaction) {
        self.keys.insert(key);
        self.transactions.push(row);
    }
}

impl PartialEq for Ledger {
    fn eq(&self, other: &Self) -> bool {
        self.transactions == other.transactions
    }
}

impl Eq for Ledger {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerSnapshot {
    transactions: Vec<Transaction>,
}

impl From<LedgerSnapshot> for Ledger {
    fn from(snapshot: LedgerSnapshot) -> Self {
        Ledger::from_transactions(snapshot.transactions)
    }
}

impl From<Ledger> for LedgerSnapshot {
    fn from(ledger: Ledger) -> Self {
        Self {
            transactions: ledger.transactions,
        }
    }
}
