pub mod aggregate;
pub mod categorize;
pub mod contracts;
pub mod error;
pub mod export;
pub mod ingest;
pub mod ledger;
pub mod transaction;
pub mod window;

pub use aggregate::{AggregateView, ViewSpec, aggregate};
pub use categorize::{CategoryRule, RuleSet, categorize};
pub use contracts::envelope::{FailureEnvelope, SuccessEnvelope};
pub use error::{CoreError, CoreResult};
pub use ingest::{IngestOutcome, IngestSource, ingest, normalize, parse};
pub use ledger::{Ledger, merge};
pub use transaction::{Transaction, TransactionKind};
pub use window::{Horizon, WindowSelection, select_window};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
