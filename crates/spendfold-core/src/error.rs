use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

pub(crate) const INGEST_HELP_COMMAND: &str = "spendfold ingest --help";
pub(crate) const REPORT_HELP_COMMAND: &str = "spendfold report --help";

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CoreError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl CoreError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `spendfold {cmd} --help` for usage."),
            None => "Run `spendfold --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    /// A custom window bound that is not a real calendar date.
    pub fn invalid_range(field_name: &str, received: &str) -> Self {
        Self::new(
            "invalid_range",
            &format!(
                "`{field_name}` must be a real calendar date (YYYY-MM-DD or DD/MM/YYYY); got \"{received}\"."
            ),
            vec![
                "Pass both window bounds as valid dates.".to_string(),
                format!("Run `{REPORT_HELP_COMMAND}` for horizon options."),
            ],
        )
        .with_data(json!({
            "field": field_name,
            "received": received,
        }))
    }

    pub fn invalid_horizon(received: &str) -> Self {
        Self::new(
            "invalid_range",
            &format!("Unknown horizon `{received}`. Use one of 7d, 30d, 90d, 12m."),
            vec![
                "Pick a supported horizon, or pass --from and --to for a custom range.".to_string(),
            ],
        )
        .with_data(json!({
            "received": received,
            "supported_horizons": ["7d", "30d", "90d", "12m"],
        }))
    }

    pub fn invalid_top_n(received: usize) -> Self {
        Self::new(
            "invalid_top_n",
            "Top-N requests need a positive `k`.",
            vec!["Pass --top with a value of 1 or more.".to_string()],
        )
        .with_data(json!({
            "received": received,
        }))
    }

    pub fn invalid_rule_set(detail: &str) -> Self {
        Self::new(
            "invalid_rule_set",
            &format!("Category rules could not be loaded: {detail}"),
            vec![
                "Every [[rules]] entry needs a non-empty `pattern` and `category`.".to_string(),
                "`match` must be \"contains\" or \"exact\" when present.".to_string(),
            ],
        )
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }

    pub fn export_failed(detail: &str) -> Self {
        Self::new(
            "export_failed",
            &format!("Writing consolidated output failed: {detail}"),
            vec!["Check the output location is writable and retry.".to_string()],
        )
    }

    pub fn source_read_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "source_read_failed",
            &format!("Cannot read export `{location}`: {detail}"),
            vec![
                "Check the path exists and is a readable UTF-8 CSV file.".to_string(),
                format!("Run `{INGEST_HELP_COMMAND}` for the expected export format."),
            ],
        )
        .with_data(json!({
            "path": location,
        }))
    }

    pub fn ledger_read_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_read_failed",
            &format!("Cannot read ledger at `{location}`: {detail}"),
            vec![format!(
                "Grant read access to `{location}` or set `SPENDFOLD_HOME` to another directory."
            )],
        )
    }

    pub fn ledger_write_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_write_failed",
            &format!("Cannot write ledger at `{location}`: {detail}"),
            vec![format!(
                "Grant write access to `{location}` or set `SPENDFOLD_HOME` to a writable directory."
            )],
        )
    }

    pub fn ledger_corrupt(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_corrupt",
            &format!("Ledger snapshot at `{location}` is not valid JSON: {detail}"),
            vec![
                format!("Restore `{location}` from a backup, or move it aside and re-ingest."),
                format!("Run `{INGEST_HELP_COMMAND}` for the ingest workflow."),
            ],
        )
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
