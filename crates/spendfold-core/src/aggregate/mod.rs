pub mod monthly;
pub mod pivot;
pub mod top;
pub mod totals;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::CoreResult;
use crate::transaction::Transaction;

pub use monthly::{AbcClass, AbcEntry, MonthTotal, Summary, abc_curve, monthly_totals, summary};
pub use pivot::{PivotFilter, PivotSpec, SortDirection, SortKey, pivot, pivot_with};
pub use top::{TopMetric, top_by_frequency, top_by_value};
pub use totals::{CategoryTotal, EntityTotal, category_totals, entity_totals};

/// Which derived view to compute over a categorized, windowed record set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewSpec {
    CategoryTotals,
    EntityTotals,
    TopN { k: usize, metric: TopMetric },
    Pivot(PivotSpec),
    MonthlyTotals { budget: Option<Decimal> },
    AbcCurve,
    Summary,
}

impl ViewSpec {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CategoryTotals => "category_totals",
            Self::EntityTotals => "entity_totals",
            Self::TopN { .. } => "top_n",
            Self::Pivot(_) => "pivot",
            Self::MonthlyTotals { .. } => "monthly_totals",
            Self::AbcCurve => "abc_curve",
            Self::Summary => "summary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "rows", rename_all = "snake_case")]
pub enum AggregateView {
    CategoryTotals(Vec<CategoryTotal>),
    EntityTotals(Vec<EntityTotal>),
    TopTransactions(Vec<Transaction>),
    TopEntities(Vec<EntityTotal>),
    Pivot(Vec<Transaction>),
    MonthlyTotals(Vec<MonthTotal>),
    AbcCurve(Vec<AbcEntry>),
    Summary(Summary),
}

impl AggregateView {
    /// Number of rows in the view; a summary counts as one.
    pub fn len(&self) -> usize {
        match self {
            Self::CategoryTotals(rows) => rows.len(),
            Self::EntityTotals(rows) | Self::TopEntities(rows) => rows.len(),
            Self::TopTransactions(rows) | Self::Pivot(rows) => rows.len(),
            Self::MonthlyTotals(rows) => rows.len(),
            Self::AbcCurve(rows) => rows.len(),
            Self::Summary(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn aggregate(records: &[Transaction], spec: &ViewSpec) -> CoreResult<AggregateView> {
    let view = match spec {
        ViewSpec::CategoryTotals => AggregateView::CategoryTotals(category_totals(records)),
        ViewSpec::EntityTotals => AggregateView::EntityTotals(entity_totals(records)),
        ViewSpec::TopN {
            k,
            metric: TopMetric::Value,
        } => AggregateView::TopTransactions(top_by_value(records, *k)?),
        ViewSpec::TopN {
            k,
            metric: TopMetric::Frequency,
        } => AggregateView::TopEntities(top_by_frequency(records, *k)?),
        ViewSpec::Pivot(pivot_spec) => AggregateView::Pivot(pivot(records, pivot_spec)),
        ViewSpec::MonthlyTotals { budget } => {
            AggregateView::MonthlyTotals(monthly_totals(records, *budget))
        }
        ViewSpec::AbcCurve => AggregateView::AbcCurve(abc_curve(records)),
        ViewSpec::Summary => AggregateView::Summary(summary(records)),
    };

    debug!(
        view = spec.name(),
        input = records.len(),
        rows = view.len(),
        "computed aggregate view"
    );
    Ok(view)
}
