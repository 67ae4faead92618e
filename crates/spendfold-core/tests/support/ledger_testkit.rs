use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use spendfold_core::categorize::{CategoryRule, RuleSet};
use spendfold_core::ingest::{IngestSource, ingest};
use spendfold_core::ledger::Ledger;
use spendfold_core::transaction::{IdentityKey, Transaction};

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap_or_default()
}

pub fn transaction(day: &str, title: &str, amount: Decimal) -> Transaction {
    Transaction::new(date(day), title, amount)
}

/// Renders rows as a `date,title,amount` export.
pub fn export_csv(rows: &[(&str, &str, &str)]) -> String {
    let mut text = String::from("date,title,amount\n");
    for (day, title, amount) in rows {
        text.push_str(&format!("{day},{title},{amount}\n"));
    }
    text
}

pub fn ingest_exports(ledger: Ledger, exports: &[(&str, String)]) -> Ledger {
    let sources = exports
        .iter()
        .map(|(name, text)| IngestSource::new(name, text))
        .collect::<Vec<IngestSource>>();
    ingest(ledger, &sources).ledger
}

pub fn key_set(ledger: &Ledger) -> HashSet<IdentityKey> {
    ledger.identity_keys().clone()
}

pub fn household_rules() -> RuleSet {
    let rules = RuleSet::new(vec![
        CategoryRule::contains("uber", "transport"),
        CategoryRule::contains("posto", "fuel"),
        CategoryRule::contains("mercado", "groceries"),
        CategoryRule::contains("padaria", "food"),
    ]);
    assert!(rules.is_ok());
    rules.unwrap_or_default()
}

/// A fixed year of mixed activity for the scenario checks.
pub fn year_of_activity() -> Vec<(&'static str, &'static str, &'static str)> {
    vec![
        ("2023-11-20", "Mercado Central", "210.40"),
        ("2024-01-01", "UBER TRIP", "23.50"),
        ("2024-01-15", "Padaria Pao Quente", "12.90"),
        ("2024-02-03", "Posto Shell", "150.00"),
        ("2024-03-08", "Pagamento recebido", "-1200.00"),
        ("2024-04-22", "Mercado Central", "310.75"),
        ("2024-06-02", "Pagamento recebido", "-450.00"),
        ("2024-07-19", "Livraria Cultura", "89.90"),
        ("2024-09-30", "uber trip", "31.20"),
        ("2024-11-11", "Posto Shell", "175.30"),
        ("2024-12-24", "Padaria Pao Quente", "48.00"),
        ("2024-12-31", "Mercado Central", "402.10"),
    ]
}
