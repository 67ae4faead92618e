use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::transaction::{Transaction, entity_key};
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Date,
    Amount,
    Title,
    Category,
}

impl SortKey {
    pub fn parse(value: &str) -> CoreResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "amount" => Ok(Self::Amount),
            "title" => Ok(Self::Title),
            "category" => Ok(Self::Category),
            _ => Err(CoreError::invalid_argument_for_command(
                &format!("Unknown sort key `{value}`. Use date, amount, title or category."),
                Some("report"),
            )),
        }
    }

    fn compare(self, left: &Transaction, right: &Transaction) -> Ordering {
        match self {
            Self::Date => left.date.cmp(&right.date),
            Self::Amount => left.amount.cmp(&right.amount),
            Self::Title => left.entity.cmp(&right.entity),
            Self::Category => left.category_label().cmp(right.category_label()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PivotFilter {
    pub category: Option<String>,
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    pub include_non_expense: bool,
}

impl PivotFilter {
    pub fn accepts(&self, row: &Transaction) -> bool {
        if !self.include_non_expense && !row.counts_as_spending() {
            return false;
        }
        if let Some(category) = &self.category
            && !row.category_label().eq_ignore_ascii_case(category)
        {
            return false;
        }
        if let Some(search) = &self.search
            && !row.entity.contains(&entity_key(search))
        {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PivotSpec {
    pub filter: PivotFilter,
    pub sort: SortKey,
    pub direction: SortDirection,
}

pub fn pivot(records: &[Transaction], spec: &PivotSpec) -> Vec<Transaction> {
    pivot_with(records, |row| spec.filter.accepts(row), spec.sort, spec.direction)
}

/// Filters with any caller predicate, then stable-sorts. Rows with equal
/// keys keep their input order in both directions.
pub fn pivot_with<F>(
    records: &[Transaction],
    predicate: F,
    sort: SortKey,
    direction: SortDirection,
) -> Vec<Transaction>
where
    F: Fn(&Transaction) -> bool,
{
    let mut rows = records
        .iter()
        .filter(|row| predicate(row))
        .cloned()
        .collect::<Vec<Transaction>>();
    match direction {
        SortDirection::Ascending => rows.sort_by(|left, right| sort.compare(left, right)),
        SortDirection::Descending => rows.sort_by(|left, right| sort.compare(right, left)),
    }
    rows
}
