pub mod rules;

use tracing::debug;

use crate::transaction::{PAYMENT_LABEL, Transaction, UNCATEGORIZED_LABEL};

pub use rules::{
    Assignment, CategoryRule, DEFAULT_PAYMENT_PATTERNS, MATCH_ALL_PATTERN, MatchKind, RuleSet,
};

/// Assigns a category to every record, replacing whatever was there.
///
/// Expenses always receive exactly one label. Non-expenses only carry the
/// payment label, and only when a payment pattern matches.
pub fn categorize(records: Vec<Transaction>, rules: &RuleSet) -> Vec<Transaction> {
    let mut uncategorized = 0_usize;
    let categorized = records
        .into_iter()
        .map(|mut row| {
            row.category = if row.is_expense() {
                let assignment = rules.evaluate(&row.entity);
                if assignment.label == UNCATEGORIZED_LABEL {
                    uncategorized += 1;
                }
                Some(assignment.label)
            } else if rules.is_payment(&row.entity) {
                Some(PAYMENT_LABEL.to_string())
            } else {
                None
            };
            row
        })
        .collect::<Vec<Transaction>>();

    debug!(
        records = categorized.len(),
        rules = rules.rules().len(),
        unmatched = uncategorized,
        "categorized records"
    );
    categorized
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::{CategoryRule, RuleSet, categorize};
    use crate::transaction::Transaction;

    fn row(title: &str, amount: Decimal) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap_or_default();
        Transaction::new(date, title, amount)
    }

    #[test]
    fn every_expense_gets_exactly_one_label() {
        let rules = RuleSet::new(vec![CategoryRule::contains("uber", "transport")]);
        assert!(rules.is_ok());
        if let Ok(rules) = rules {
            let rows = categorize(
                vec![
                    row("UBER EATS", dec!(31.90)),
                    row("Padaria", dec!(9.90)),
                    row("Estorno", dec!(-12.00)),
                ],
                &rules,
            );
            assert_eq!(rows[0].category.as_deref(), Some("transport"));
            assert_eq!(rows[1].category.as_deref(), Some("uncategorized"));
            assert!(rows[2].category.is_none());
        }
    }

    #[test]
    fn positive_payment_rows_are_routed_to_payment() {
        let rules = RuleSet::default();
        let rows = categorize(
            vec![
                row("Pagamento recebido", dec!(450.00)),
                row("Pagamento recebido", dec!(-450.00)),
            ],
            &rules,
        );
        assert_eq!(rows[0].category.as_deref(), Some("payment"));
        assert!(!rows[0].counts_as_spending());
        assert_eq!(rows[1].category.as_deref(), Some("payment"));
    }

    #[test]
    fn rerun_with_new_rules_leaves_no_stale_labels() {
        let first = RuleSet::new(vec![CategoryRule::contains("mercado", "groceries")]);
        let second = RuleSet::new(vec![CategoryRule::contains("posto", "fuel")]);
        assert!(first.is_ok() && second.is_ok());
        if let (Ok(first), Ok(second)) = (first, second) {
            let once = categorize(vec![row("Mercado", dec!(80.00))], &first);
            assert_eq!(once[0].category.as_deref(), Some("groceries"));
            let twice = categorize(once, &second);
            assert_eq!(twice[0].category.as_deref(), Some("uncategorized"));
        }
    }
}
