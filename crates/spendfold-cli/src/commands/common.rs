use chrono::NaiveDate;
use serde::Serialize;
use spendfold_core::categorize::{RuleSet, categorize};
use spendfold_core::contracts::types::DataRange;
use spendfold_core::ledger::Ledger;
use spendfold_core::window::date::parse_export_date;
use spendfold_core::window::{Horizon, WindowSelection, select_window};
use spendfold_core::{CoreError, CoreResult};

use crate::cli::WindowArgs;

/// Window facts echoed back with every report and export.
#[derive(Debug, Clone, Serialize)]
pub struct WindowSummary {
    pub horizon: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub reference: Option<NaiveDate>,
    pub rows: usize,
    pub data_covers: DataRange,
}

pub fn resolve_horizon(window: &WindowArgs) -> CoreResult<Horizon> {
    match (&window.from, &window.to, &window.horizon) {
        (Some(from), Some(to), _) => Horizon::custom(from, to),
        (_, _, Some(label)) => Horizon::parse(label),
        _ => Ok(Horizon::default()),
    }
}

pub fn resolve_reference(window: &WindowArgs) -> CoreResult<Option<NaiveDate>> {
    window
        .reference
        .as_deref()
        .map(|value| {
            parse_export_date(value).ok_or_else(|| CoreError::invalid_range("reference", value))
        })
        .transpose()
}

/// Selects the requested window of the ledger, then categorizes it.
pub fn categorized_window(
    ledger: &Ledger,
    window: &WindowArgs,
    rules: &RuleSet,
) -> CoreResult<WindowSelection> {
    let horizon = resolve_horizon(window)?;
    let reference = resolve_reference(window)?;
    let mut selection = select_window(ledger.transactions(), reference, horizon);
    selection.transactions = categorize(selection.transactions, rules);
    Ok(selection)
}

pub fn window_summary(ledger: &Ledger, selection: &WindowSelection) -> WindowSummary {
    WindowSummary {
        horizon: selection.horizon.label(),
        start: selection.range.map(|range| range.start),
        end: selection.range.map(|range| range.end),
        reference: selection.reference,
        rows: selection.transactions.len(),
        data_covers: ledger.data_range(),
    }
}

#[cfg(test)]
mod tests {
    use spendfold_core::window::Horizon;

    use super::{resolve_horizon, resolve_reference};
    use crate::cli::WindowArgs;

    #[test]
    fn defaults_to_twelve_months() {
        let horizon = resolve_horizon(&WindowArgs::default());
        assert_eq!(horizon.ok(), Some(Horizon::Months12));
    }

    #[test]
    fn custom_bounds_win_over_horizon_label() {
        let window = WindowArgs {
            from: Some("2024-01-01".to_string()),
            to: Some("31/01/2024".to_string()),
            ..WindowArgs::default()
        };
        let horizon = resolve_horizon(&window);
        assert!(matches!(horizon, Ok(Horizon::Custom { .. })));
    }

    #[test]
    fn malformed_reference_is_an_invalid_range() {
        let window = WindowArgs {
            reference: Some("yesterday".to_string()),
            ..WindowArgs::default()
        };
        let reference = resolve_reference(&window);
        assert!(reference.is_err());
        if let Err(error) = reference {
            assert_eq!(error.code, "invalid_range");
        }
    }
}
