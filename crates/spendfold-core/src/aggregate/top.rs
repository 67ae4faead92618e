use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aggregate::totals::{EntityTotal, by_total_desc, entity_totals, spending};
use crate::transaction::Transaction;
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopMetric {
    #[default]
    Value,
    Frequency,
}

impl TopMetric {
    pub fn parse(value: &str) -> CoreResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "value" => Ok(Self::Value),
            "frequency" => Ok(Self::Frequency),
            _ => Err(CoreError::invalid_argument_for_command(
                &format!("Unknown top-N metric `{value}`. Use `value` or `frequency`."),
                Some("report"),
            )),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Frequency => "frequency",
        }
    }
}

impl fmt::Display for TopMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Largest individual expenses. Ties go to the later date, then the
/// alphabetically earlier title.
pub fn top_by_value(records: &[Transaction], k: usize) -> CoreResult<Vec<Transaction>> {
    ensure_positive(k)?;
    let mut ranked = spending(records).cloned().collect::<Vec<Transaction>>();
    ranked.sort_by(|left, right| {
        by_total_desc(left.amount, right.amount)
            .then_with(|| right.date.cmp(&left.date))
            .then_with(|| left.title.cmp(&right.title))
    });
    ranked.truncate(k);
    Ok(ranked)
}

/// Most frequent entities with their aggregate value. Equal counts fall
/// back to the larger total, then the entity key.
pub fn top_by_frequency(records: &[Transaction], k: usize) -> CoreResult<Vec<EntityTotal>> {
    ensure_positive(k)?;
    let mut ranked = entity_totals(records);
    ranked.sort_by(|left, right| {
        right
            .count
            .cmp(&left.count)
            .then_with(|| by_total_desc(left.total, right.total))
            .then_with(|| left.entity.cmp(&right.entity))
    });
    ranked.truncate(k);
    Ok(ranked)
}

fn ensure_positive(k: usize) -> CoreResult<()> {
    if k == 0 {
        return Err(CoreError::invalid_top_n(k));
    }
    Ok(())
}
