pub mod date;

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::transaction::Transaction;
use crate::window::date::{add_months_clamped, format_iso_date, parse_export_date};
use crate::{CoreError, CoreResult};

/// Requested time span for a window query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizon {
    Days7,
    Days30,
    Days90,
    Months12,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl Horizon {
    pub fn parse(value: &str) -> CoreResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "7d" => Ok(Self::Days7),
            "30d" => Ok(Self::Days30),
            "90d" => Ok(Self::Days90),
            "12m" => Ok(Self::Months12),
            _ => Err(CoreError::invalid_horizon(value)),
        }
    }

    /// Custom bounds must be real dates; an inverted pair is allowed and
    /// simply selects nothing.
    pub fn custom(start: &str, end: &str) -> CoreResult<Self> {
        let start_date =
            parse_export_date(start).ok_or_else(|| CoreError::invalid_range("from", start))?;
        let end_date = parse_export_date(end).ok_or_else(|| CoreError::invalid_range("to", end))?;
        Ok(Self::Custom {
            start: start_date,
            end: end_date,
        })
    }

    pub fn label(&self) -> String {
        match self {
            Self::Days7 => "7d".to_string(),
            Self::Days30 => "30d".to_string(),
            Self::Days90 => "90d".to_string(),
            Self::Months12 => "12m".to_string(),
            Self::Custom { start, end } => {
                format!("{}..{}", format_iso_date(start), format_iso_date(end))
            }
        }
    }

    /// Inclusive range implied by this horizon when anchored at `reference`.
    pub fn resolve(&self, reference: NaiveDate) -> DateRange {
        match self {
            Self::Days7 => trailing_days(reference, 7),
            Self::Days30 => trailing_days(reference, 30),
            Self::Days90 => trailing_days(reference, 90),
            Self::Months12 => DateRange {
                start: add_months_clamped(reference, -12) + Duration::days(1),
                end: reference,
            },
            Self::Custom { start, end } => DateRange {
                start: *start,
                end: *end,
            },
        }
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self::Months12
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn trailing_days(reference: NaiveDate, days: i64) -> DateRange {
    DateRange {
        start: reference - Duration::days(days - 1),
        end: reference,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

#[derive(Debug, Clone)]
pub struct WindowSelection {
    pub horizon: Horizon,
    pub reference: Option<NaiveDate>,
    pub range: Option<DateRange>,
    pub transactions: Vec<Transaction>,
}

/// Filters `records` to the horizon anchored at `reference`, or at the
/// latest date in `records` when no reference is given. Record order is
/// preserved.
pub fn select_window(
    records: &[Transaction],
    reference: Option<NaiveDate>,
    horizon: Horizon,
) -> WindowSelection {
    let anchor = match horizon {
        Horizon::Custom { end, .. } => reference.or(Some(end)),
        _ => reference.or_else(|| records.iter().map(|row| row.date).max()),
    };

    let Some(anchor) = anchor else {
        return WindowSelection {
            horizon,
            reference: None,
            range: None,
            transactions: Vec::new(),
        };
    };

    let range = horizon.resolve(anchor);
    let transactions = if range.is_inverted() {
        Vec::new()
    } else {
        records
            .iter()
            .filter(|row| range.contains(row.date))
            .cloned()
            .collect::<Vec<Transaction>>()
    };

    debug!(
        horizon = %horizon,
        start = %range.start,
        end = %range.end,
        selected = transactions.len(),
        "selected window"
    );
    WindowSelection {
        horizon,
        reference: Some(anchor),
        range: Some(range),
        transactions,
    }
}
