use tracing::debug;

use crate::ingest::parse::ParsedRecord;
use crate::transaction::{Transaction, TransactionKind};

/// Turns parsed rows into ledger transactions: trimmed display title,
/// case-folded entity key, and an expense/non-expense tag from the sign.
pub fn normalize(records: Vec<ParsedRecord>) -> Vec<Transaction> {
    let normalized = records
        .into_iter()
        .map(|record| Transaction::new(record.date, &record.title, record.amount))
        .collect::<Vec<Transaction>>();

    debug!(
        records = normalized.len(),
        expenses = normalized
            .iter()
            .filter(|row| row.kind == TransactionKind::Expense)
            .count(),
        "normalized records"
    );
    normalized
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::normalize;
    use crate::ingest::parse::ParsedRecord;
    use crate::transaction::TransactionKind;

    #[test]
    fn keeps_display_casing_and_tags_sign() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 2);
        assert!(date.is_some());
        if let Some(date) = date {
            let rows = normalize(vec![
                ParsedRecord {
                    row: 1,
                    date,
                    title: "  Pagamento   Recebido ".to_string(),
                    amount: dec!(-450.00),
                },
                ParsedRecord {
                    row: 2,
                    date,
                    title: "UBER EATS".to_string(),
                    amount: dec!(31.90),
                },
            ]);

            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].title, "Pagamento   Recebido");
            assert_eq!(rows[0].entity, "pagamento recebido");
            assert_eq!(rows[0].kind, TransactionKind::NonExpense);
            assert_eq!(rows[1].kind, TransactionKind::Expense);
            assert!(rows.iter().all(|row| row.category.is_none()));
        }
    }
}
