use std::cmp::Ordering;
use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::transaction::Transaction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
    pub count: usize,
}

/// Totals for one normalized title. `title` is the display text of the
/// first row seen for the entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityTotal {
    pub entity: String,
    pub title: String,
    pub total: Decimal,
    pub count: usize,
}

pub fn category_totals(records: &[Transaction]) -> Vec<CategoryTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for row in spending(records) {
        let label = row.category_label();
        let slot = match index.get(label) {
            Some(slot) => *slot,
            None => {
                index.insert(label, totals.len());
                totals.push(CategoryTotal {
                    category: label.to_string(),
                    total: Decimal::ZERO,
                    count: 0,
                });
                totals.len() - 1
            }
        };
        totals[slot].total = totals[slot].total.saturating_add(row.amount);
        totals[slot].count += 1;
    }

    totals.sort_by(|left, right| {
        by_total_desc(left.total, right.total).then_with(|| left.category.cmp(&right.category))
    });
    totals
}

pub fn entity_totals(records: &[Transaction]) -> Vec<EntityTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<EntityTotal> = Vec::new();

    for row in spending(records) {
        let slot = match index.get(row.entity.as_str()) {
            Some(slot) => *slot,
            None => {
                index.insert(row.entity.as_str(), totals.len());
                totals.push(EntityTotal {
                    entity: row.entity.clone(),
                    title: row.title.clone(),
                    total: Decimal::ZERO,
                    count: 0,
                });
                totals.len() - 1
            }
        };
        totals[slot].total = totals[slot].total.saturating_add(row.amount);
        totals[slot].count += 1;
    }

    totals.sort_by(|left, right| {
        by_total_desc(left.total, right.total).then_with(|| left.entity.cmp(&right.entity))
    });
    totals
}

pub(crate) fn spending(records: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    records.iter().filter(|row| row.counts_as_spending())
}

pub(crate) fn spending_total(records: &[Transaction]) -> Decimal {
    spending(records).fold(Decimal::ZERO, |sum, row| sum.saturating_add(row.amount))
}

pub(crate) fn by_total_desc(left: Decimal, right: Decimal) -> Ordering {
    right.cmp(&left)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::{category_totals, entity_totals, spending_total};
    use crate::aggregate::{AggregateView, ViewSpec, aggregate};
    use crate::transaction::Transaction;

    fn row(title: &str, amount: Decimal, category: Option<&str>) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap_or_default();
        let mut transaction = Transaction::new(date, title, amount);
        transaction.category = category.map(str::to_string);
        transaction
    }

    #[test]
    fn category_totals_order_by_sum_then_name() {
        let rows = vec![
            row("Posto", dec!(50.00), Some("fuel")),
            row("Mercado", dec!(30.00), Some("groceries")),
            row("Hortifruti", dec!(20.00), Some("groceries")),
            row("Farmacia", dec!(50.00), Some("health")),
            row("Pagamento recebido", dec!(-200.00), Some("payment")),
        ];
        let totals = category_totals(&rows);
        let names = totals
            .iter()
            .map(|total| total.category.as_str())
            .collect::<Vec<&str>>();
        assert_eq!(names, vec!["fuel", "groceries", "health"]);
        assert_eq!(totals[1].count, 2);
        assert_eq!(totals[1].total, dec!(50.00));
    }

    #[test]
    fn category_totals_conserve_the_spending_sum() {
        let rows = vec![
            row("Uber", dec!(23.50), Some("transport")),
            row("Padaria", dec!(9.90), None),
            row("Juros rotativo", dec!(14.00), Some("hidden")),
            row("Estorno", dec!(-5.00), None),
        ];
        let sum = category_totals(&rows)
            .iter()
            .map(|total| total.total)
            .sum::<Decimal>();
        assert_eq!(sum, spending_total(&rows));
        assert_eq!(sum, dec!(33.40));
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let rows = vec![
            row("Loja", Decimal::MAX, Some("shopping")),
            row("Loja", Decimal::MAX, Some("shopping")),
        ];
        let totals = category_totals(&rows);
        assert_eq!(totals[0].total, Decimal::MAX);
        assert_eq!(entity_totals(&rows)[0].total, Decimal::MAX);
        assert_eq!(spending_total(&rows), Decimal::MAX);

        let result = aggregate(&rows, &ViewSpec::AbcCurve);
        assert!(result.is_ok());
        if let Ok(AggregateView::AbcCurve(curve)) = result {
            assert_eq!(curve[0].cumulative_pct, dec!(100.0));
        }
    }

    #[test]
    fn entity_totals_group_across_title_casing() {
        let rows = vec![
            row("UBER TRIP", dec!(10.00), None),
            row("Uber Trip", dec!(12.00), None),
            row("Cafe", dec!(22.00), None),
        ];
        let totals = entity_totals(&rows);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].entity, "cafe");
        assert_eq!(totals[1].entity, "uber trip");
        assert_eq!(totals[1].title, "UBER TRIP");
        assert_eq!(totals[1].count, 2);
    }
}
