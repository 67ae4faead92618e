use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Label assigned when no category rule matches an expense.
pub const UNCATEGORIZED_LABEL: &str = "uncategorized";
/// Label for payments received; never counted as spending.
pub const PAYMENT_LABEL: &str = "payment";
/// Label for titles the rule set hides from spending views (interest, fees).
pub const HIDDEN_LABEL: &str = "hidden";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Expense,
    NonExpense,
}

impl TransactionKind {
    pub fn from_amount(amount: Decimal) -> Self {
        if amount > Decimal::ZERO {
            Self::Expense
        } else {
            Self::NonExpense
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::NonExpense => "non_expense",
        }
    }
}

/// Deduplication identity: two rows are the same event iff these match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    pub date: NaiveDate,
    pub entity: String,
    pub amount: Decimal,
}

/// One card transaction after normalization.
///
/// `date`, `title` and `amount` never change once recorded. `category` is
/// owned by the categorizer and is overwritten on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TransactionRecord", into = "TransactionRecord")]
pub struct Transaction {
    pub date: NaiveDate,
    pub title: String,
    pub entity: String,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub category: Option<String>,
}

impl Transaction {
    pub fn new(date: NaiveDate, title: &str, amount: Decimal) -> Self {
        let display = title.trim().to_string();
        Self {
            date,
            entity: entity_key(&display),
            title: display,
            amount,
            kind: TransactionKind::from_amount(amount),
            category: None,
        }
    }

    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            date: self.date,
            entity: self.entity.clone(),
            amount: self.amount.normalize(),
        }
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Expense rows that spending views should include.
    pub fn counts_as_spending(&self) -> bool {
        if !self.is_expense() {
            return false;
        }
        !matches!(
            self.category.as_deref(),
            Some(PAYMENT_LABEL) | Some(HIDDEN_LABEL)
        )
    }

    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or(UNCATEGORIZED_LABEL)
    }
}

/// Case-folded, whitespace-collapsed title used for identity and grouping.
pub fn entity_key(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_lowercase()
}

/// Wire form of a transaction in the structured record set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub title: String,
    pub amount: Decimal,
    #[serde(default)]
    pub category: Option<String>,
}

impl From<TransactionRecord> for Transaction {
    fn from(record: TransactionRecord) -> Self {
        let mut transaction = Transaction::new(record.date, &record.title, record.amount);
        transaction.category = record.category;
        transaction
    }
}

impl From<Transaction> for TransactionRecord {
    fn from(transaction: Transaction) -> Self {
        Self {
            date: transaction.date,
            title: transaction.title,
            amount: transaction.amount,
            category: transaction.category,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::{PAYMENT_LABEL, Transaction, TransactionKind, entity_key};

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap_or_default()
    }

    #[test]
    fn entity_key_folds_case_and_collapses_whitespace() {
        assert_eq!(entity_key("  UBER   *Trip "), "uber *trip");
        assert_eq!(entity_key("Pagamento Recebido"), "pagamento recebido");
    }

    #[test]
    fn kind_follows_amount_sign() {
        assert_eq!(TransactionKind::from_amount(dec!(0.01)), TransactionKind::Expense);
        assert_eq!(TransactionKind::from_amount(dec!(0)), TransactionKind::NonExpense);
        assert_eq!(
            TransactionKind::from_amount(dec!(-450.00)),
            TransactionKind::NonExpense
        );
    }

    #[test]
    fn identity_key_ignores_trailing_zero_scale_and_title_case() {
        let left = Transaction::new(date("2024-05-01"), "UBER TRIP", dec!(23.50));
        let right = Transaction::new(date("2024-05-01"), "Uber  Trip", dec!(23.5));
        assert_eq!(left.identity_key(), right.identity_key());
        assert_eq!(right.title, "Uber  Trip");
    }

    #[test]
    fn payment_labelled_expense_does_not_count_as_spending() {
        let mut row = Transaction::new(date("2024-06-02"), "Pagamento recebido", dec!(450.00));
        assert!(row.counts_as_spending());
        row.category = Some(PAYMENT_LABEL.to_string());
        assert!(row.is_expense());
        assert!(!row.counts_as_spending());
    }

    #[test]
    fn wire_form_round_trips_category_and_rebuilds_entity() {
        let mut row = Transaction::new(date("2024-05-01"), "Padaria Central", dec!(12.40));
        row.category = Some("Restaurante".to_string());
        let encoded = serde_json::to_string(&row);
        assert!(encoded.is_ok());
        if let Ok(text) = encoded {
            assert!(text.contains("\"date\":\"2024-05-01\""));
            let decoded: Result<Transaction, _> = serde_json::from_str(&text);
            assert!(decoded.is_ok());
            if let Ok(value) = decoded {
                assert_eq!(value, row);
                assert_eq!(value.entity, "padaria central");
            }
        }
    }
}
