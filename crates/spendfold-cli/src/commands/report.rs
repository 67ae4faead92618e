use std::path::Path;

use rust_decimal::Decimal;
use serde::Serialize;
use spendfold_core::aggregate::{
    AggregateView, PivotFilter, PivotSpec, SortDirection, SortKey, TopMetric, ViewSpec, aggregate,
};
use spendfold_core::contracts::envelope::{SuccessEnvelope, success};
use spendfold_core::ingest::parse_amount;
use spendfold_core::{CoreError, CoreResult};

use crate::cli::{MetricArg, ReportView, SortArg, WindowArgs};
use crate::commands::common::{WindowSummary, categorized_window, window_summary};
use crate::rules::load_rules;
use crate::store;

#[derive(Debug, Clone, Default)]
pub struct ReportOptions<'a> {
    pub window: WindowArgs,
    pub top: usize,
    pub metric: Option<MetricArg>,
    pub sort: Option<SortArg>,
    pub descending: bool,
    pub category: Option<String>,
    pub search: Option<String>,
    pub include_non_expense: bool,
    pub budget: Option<String>,
    pub rules_path: Option<&'a Path>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub window: WindowSummary,
    #[serde(flatten)]
    pub result: AggregateView,
}

pub fn run(view: ReportView, options: ReportOptions<'_>) -> CoreResult<SuccessEnvelope> {
    let spec = view_spec(view, &options)?;
    let home = store::resolve_ledger_home(options.home_override)?;
    let rules = load_rules(options.rules_path)?;
    let state = store::load(&home)?;

    let selection = categorized_window(&state.ledger, &options.window, &rules)?;
    let result = aggregate(&selection.transactions, &spec)?;

    success(
        "report",
        ReportData {
            window: window_summary(&state.ledger, &selection),
            result,
        },
    )
}

/// Maps report flags onto a view spec. Flag errors surface before the
/// ledger is read.
pub fn view_spec(view: ReportView, options: &ReportOptions<'_>) -> CoreResult<ViewSpec> {
    if view == ReportView::Top && options.top == 0 {
        return Err(CoreError::invalid_top_n(options.top));
    }
    let spec = match view {
        ReportView::Categories => ViewSpec::CategoryTotals,
        ReportView::Entities => ViewSpec::EntityTotals,
        ReportView::Top => ViewSpec::TopN {
            k: options.top,
            metric: match options.metric.unwrap_or(MetricArg::Value) {
                MetricArg::Value => TopMetric::Value,
                MetricArg::Frequency => TopMetric::Frequency,
            },
        },
        ReportView::Pivot => ViewSpec::Pivot(PivotSpec {
            filter: PivotFilter {
                category: options.category.clone(),
                search: options.search.clone(),
                include_non_expense: options.include_non_expense,
            },
            sort: match options.sort.unwrap_or(SortArg::Date) {
                SortArg::Date => SortKey::Date,
                SortArg::Amount => SortKey::Amount,
                SortArg::Title => SortKey::Title,
                SortArg::Category => SortKey::Category,
            },
            direction: if options.descending {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
        }),
        ReportView::Months => ViewSpec::MonthlyTotals {
            budget: options.budget.as_deref().map(parse_budget).transpose()?,
        },
        ReportView::Abc => ViewSpec::AbcCurve,
        ReportView::Summary => ViewSpec::Summary,
    };
    Ok(spec)
}

fn parse_budget(value: &str) -> CoreResult<Decimal> {
    match parse_amount(value) {
        Some(amount) if amount > Decimal::ZERO => Ok(amount),
        _ => Err(CoreError::invalid_argument_for_command(
            &format!("`--budget` must be a positive amount; got \"{value}\"."),
            Some("report"),
        )),
    }
}
