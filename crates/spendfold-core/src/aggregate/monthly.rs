use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregate::totals::{entity_totals, spending, spending_total};
use crate::transaction::Transaction;
use crate::window::date::format_month;

const ABC_CLASS_A_LIMIT: Decimal = Decimal::from_parts(80, 0, 0, false, 0);
const ABC_CLASS_B_LIMIT: Decimal = Decimal::from_parts(95, 0, 0, false, 0);
const WEEKS_PER_YEAR: Decimal = Decimal::from_parts(52, 0, 0, false, 0);
const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthTotal {
    pub month: String,
    pub total: Decimal,
    pub count: usize,
    /// Amount above the monthly budget, when one was given and exceeded.
    pub over_budget: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AbcClass {
    A,
    B,
    C,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbcEntry {
    pub entity: String,
    pub title: String,
    pub total: Decimal,
    pub count: usize,
    pub cumulative_pct: Decimal,
    pub class: AbcClass,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_expenses: Decimal,
    pub transaction_count: usize,
    pub unique_entities: usize,
    pub months_with_data: usize,
    pub average_per_month: Decimal,
    pub average_per_week: Decimal,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Spending per calendar month, oldest first.
pub fn monthly_totals(records: &[Transaction], budget: Option<Decimal>) -> Vec<MonthTotal> {
    let mut months: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();
    for row in spending(records) {
        let entry = months
            .entry(format_month(&row.date))
            .or_insert((Decimal::ZERO, 0));
        entry.0 = entry.0.saturating_add(row.amount);
        entry.1 += 1;
    }

    months
        .into_iter()
        .map(|(month, (total, count))| MonthTotal {
            month,
            total,
            count,
            over_budget: budget
                .filter(|limit| total > *limit)
                .map(|limit| total.saturating_sub(limit).round_dp(2)),
        })
        .collect()
}

/// Entities ranked by total with their cumulative share of spending.
/// Class A covers the first 80 %, B up to 95 %, C the tail.
pub fn abc_curve(records: &[Transaction]) -> Vec<AbcEntry> {
    let grand_total = spending_total(records);
    if grand_total <= Decimal::ZERO {
        return Vec::new();
    }

    let mut running = Decimal::ZERO;
    entity_totals(records)
        .into_iter()
        .map(|total| {
            running = running.saturating_add(total.total);
            let cumulative_pct = share_pct(running, grand_total);
            let class = if cumulative_pct <= ABC_CLASS_A_LIMIT {
                AbcClass::A
            } else if cumulative_pct <= ABC_CLASS_B_LIMIT {
                AbcClass::B
            } else {
                AbcClass::C
            };
            AbcEntry {
                entity: total.entity,
                title: total.title,
                total: total.total,
                count: total.count,
                cumulative_pct,
                class,
            }
        })
        .collect()
}

fn share_pct(part: Decimal, whole: Decimal) -> Decimal {
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .unwrap_or(HUNDRED)
        .round_dp(1)
}

pub fn summary(records: &[Transaction]) -> Summary {
    let total_expenses = spending_total(records);
    let rows = spending(records).collect::<Vec<&Transaction>>();
    let entities = rows
        .iter()
        .map(|row| row.entity.as_str())
        .collect::<HashSet<&str>>();
    let months = rows
        .iter()
        .map(|row| format_month(&row.date))
        .collect::<HashSet<String>>();

    let average_per_month = if months.is_empty() {
        Decimal::ZERO
    } else {
        (total_expenses / Decimal::from(months.len())).round_dp(2)
    };

    Summary {
        total_expenses,
        transaction_count: rows.len(),
        unique_entities: entities.len(),
        months_with_data: months.len(),
        average_per_month,
        average_per_week: (total_expenses / WEEKS_PER_YEAR).round_dp(2),
        first_date: rows.iter().map(|row| row.date).min(),
        last_date: rows.iter().map(|row| row.date).max(),
    }
}
