mod error_text;
mod format;
mod ingest_text;
mod json;
mod mode;
mod report_text;
mod stdout;

use std::io;

use spendfold_core::{CoreError, SuccessEnvelope};
use stdout::Delivery;

pub use mode::{OutputMode, mode_for_command};
pub use stdout::emit;

pub fn print_success(success: &SuccessEnvelope, mode: OutputMode) -> io::Result<Delivery> {
    let body = match mode {
        OutputMode::Text => render_text_success(success)?,
        OutputMode::Json => json::render_success_json(success)?,
    };
    emit(&body)
}

pub fn print_failure(error: &CoreError, mode: OutputMode) -> io::Result<Delivery> {
    let body = match mode {
        OutputMode::Json => json::render_error_json(error)?,
        OutputMode::Text => error_text::render_error(error),
    };
    emit(&body)
}

fn render_text_success(success: &SuccessEnvelope) -> io::Result<String> {
    match success.command.as_str() {
        "ingest" => ingest_text::render_ingest_run(&success.data),
        "history" => ingest_text::render_history(&success.data),
        "report" => report_text::render_report(&success.data),
        "export" => report_text::render_export(&success.data),
        _ => Err(io::Error::other(format!(
            "unsupported text output command `{}`",
            success.command
        ))),
    }
}
