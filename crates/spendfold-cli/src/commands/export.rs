use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use spendfold_core::contracts::envelope::{SuccessEnvelope, success};
use spendfold_core::export::{
    ExportMeta, consolidated_export, write_expenses_csv, write_export_json,
};
use spendfold_core::{CoreError, CoreResult};
use tracing::info;

use crate::cli::WindowArgs;
use crate::commands::common::{WindowSummary, categorized_window, window_summary};
use crate::rules::load_rules;
use crate::store;

pub const EXPORT_JSON_FILE: &str = "consolidated.json";
pub const EXPORT_CSV_FILE: &str = "consolidated_expenses.csv";

#[derive(Debug, Default)]
pub struct ExportOptions<'a> {
    pub out_dir: PathBuf,
    pub window: WindowArgs,
    pub rules_path: Option<&'a Path>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportData {
    pub json_path: String,
    pub csv_path: String,
    pub expense_rows: usize,
    pub window: WindowSummary,
    pub meta: ExportMeta,
}

pub fn run(options: ExportOptions<'_>) -> CoreResult<SuccessEnvelope> {
    let home = store::resolve_ledger_home(options.home_override)?;
    let rules = load_rules(options.rules_path)?;
    let state = store::load(&home)?;

    let selection = categorized_window(&state.ledger, &options.window, &rules)?;
    let export = consolidated_export(&selection);

    fs::create_dir_all(&options.out_dir)
        .map_err(|error| CoreError::export_failed(&error.to_string()))?;
    let json_path = options.out_dir.join(EXPORT_JSON_FILE);
    let csv_path = options.out_dir.join(EXPORT_CSV_FILE);

    let mut json_writer = BufWriter::new(create_file(&json_path)?);
    write_export_json(&export, &mut json_writer)?;
    json_writer
        .flush()
        .map_err(|error| CoreError::export_failed(&error.to_string()))?;
    let expense_rows =
        write_expenses_csv(&export.transactions, BufWriter::new(create_file(&csv_path)?))?;
    info!(
        json = %json_path.display(),
        csv = %csv_path.display(),
        rows = export.transactions.len(),
        "wrote consolidated export"
    );

    success(
        "export",
        ExportData {
            json_path: json_path.display().to_string(),
            csv_path: csv_path.display().to_string(),
            expense_rows,
            window: window_summary(&state.ledger, &selection),
            meta: export.meta,
        },
    )
}

fn create_file(path: &Path) -> CoreResult<File> {
    File::create(path)
        .map_err(|error| CoreError::export_failed(&format!("{}: {error}", path.display())))
}
