mod cli;
mod commands;
mod dispatch;
mod output;
mod rules;
mod store;

use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use spendfold_core::CoreError;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "SPENDFOLD_LOG";

const ROOT_HELP: &str = "Spendfold - consolidate credit-card exports into one categorized ledger

Usage:
  spendfold <command>

Start here:
  spendfold ingest --help
  spendfold report --help
";

const TOP_LEVEL_HELP: &str = "Spendfold - consolidate credit-card exports into one categorized ledger

USAGE: spendfold <command>

Build your ledger:
  1. spendfold ingest --help                     Read the export format and merge rules
  2. spendfold ingest --dry-run <paths..>        Validate exports without writing
  3. spendfold ingest <paths..>                  Merge exports into the ledger

See where the money went (default window: last 12 months of data):
  spendfold report categories                    Totals per category
  spendfold report top --metric frequency        Most frequent merchants
  spendfold report pivot --search uber           Filtered, sorted expense list
  spendfold report months --budget 3000          Monthly totals against a budget
  spendfold report abc                           Merchants by cumulative share
  spendfold report summary                       Totals and averages

Other commands:
  spendfold history                              List past ingests
  spendfold export --out-dir <dir>               Write consolidated.json and consolidated_expenses.csv

Options shared by every command:
  --home <dir>      Ledger directory (defaults to $SPENDFOLD_HOME, then ~/.spendfold)
  --json            Machine-readable output

Set SPENDFOLD_LOG=debug to trace pipeline stages on stderr.
";

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run() -> Result<ExitCode, ExitCode> {
    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 {
        if output::emit(ROOT_HELP).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }
    let cli = match cli::Cli::try_parse() {
        Ok(value) => value,
        Err(err) => return handle_parse_error(&err, &raw_args),
    };
    let mode = output::mode_for_command(&cli.command);

    match dispatch::dispatch(&cli) {
        Ok(success) => {
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            tracing::debug!(code = %error.code, "command failed");
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(exit_code_for_error(&error))
        }
    }
}

fn handle_parse_error(err: &clap::Error, raw_args: &[String]) -> Result<ExitCode, ExitCode> {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let text = if is_top_level_help_request(raw_args) {
                TOP_LEVEL_HELP.to_string()
            } else {
                err.to_string()
            };
            if output::emit(&text).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        ErrorKind::DisplayVersion => {
            if output::emit(&err.to_string()).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            let clean_message = strip_clap_boilerplate(&err.to_string());
            let parse_error = CoreError::invalid_argument_for_command(
                &clean_message,
                command_path_from_args(raw_args).as_deref(),
            );
            if output::print_failure(&parse_error, infer_requested_output_mode(raw_args)).is_err()
            {
                return Err(ExitCode::from(2));
            }
            Err(ExitCode::from(1))
        }
    }
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

/// Strips clap's trailing Usage line and "For more information" hint so the
/// "Next steps" section is the only guidance printed.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_end().to_string()
}

/// First known subcommand among the raw args, for help hints.
fn command_path_from_args(raw_args: &[String]) -> Option<String> {
    raw_args
        .iter()
        .skip(1)
        .filter(|value| !value.starts_with('-'))
        .find_map(|value| match value.as_str() {
            "ingest" | "history" | "report" | "export" => Some(value.clone()),
            _ => None,
        })
}

fn infer_requested_output_mode(raw_args: &[String]) -> output::OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return output::OutputMode::Json;
    }
    output::OutputMode::Text
}

fn exit_code_for_error(error: &CoreError) -> ExitCode {
    if is_internal_error(error) {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

/// Failures of the ledger store or output files, as opposed to bad input.
fn is_internal_error(error: &CoreError) -> bool {
    error.code.starts_with("internal_")
        || matches!(
            error.code.as_str(),
            "ledger_read_failed" | "ledger_write_failed" | "ledger_corrupt" | "export_failed"
        )
}
