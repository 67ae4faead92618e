use spendfold_core::{CoreResult, SuccessEnvelope};

use crate::cli::{Cli, Commands};
use crate::commands;
use crate::commands::export::ExportOptions;
use crate::commands::ingest::IngestRunOptions;
use crate::commands::report::ReportOptions;

pub fn dispatch(cli: &Cli) -> CoreResult<SuccessEnvelope> {
    let home_override = cli.home.as_deref();
    match &cli.command {
        Commands::Ingest {
            paths,
            dry_run,
            rules,
            json: _,
        } => commands::ingest::run(IngestRunOptions {
            paths,
            dry_run: *dry_run,
            rules_path: rules.as_deref(),
            home_override,
        }),
        Commands::History { .. } => commands::history::run(home_override),
        Commands::Report {
            view,
            window,
            top,
            metric,
            sort,
            desc,
            category,
            search,
            include_non_expense,
            budget,
            rules,
            json: _,
        } => commands::report::run(
            *view,
            ReportOptions {
                window: window.clone(),
                top: *top,
                metric: Some(*metric),
                sort: Some(*sort),
                descending: *desc,
                category: category.clone(),
                search: search.clone(),
                include_non_expense: *include_non_expense,
                budget: budget.clone(),
                rules_path: rules.as_deref(),
                home_override,
            },
        ),
        Commands::Export {
            out_dir,
            window,
            rules,
            json: _,
        } => commands::export::run(ExportOptions {
            out_dir: out_dir.clone(),
            window: window.clone(),
            rules_path: rules.as_deref(),
            home_override,
        }),
    }
}
