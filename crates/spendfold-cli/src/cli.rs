use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Extended help shown after `spendfold ingest --help`.
pub const INGEST_AFTER_HELP: &str = "\
Export format:
  One header row, exactly these three columns in any order:
    date,title,amount

  date    YYYY-MM-DD (DD/MM/YYYY is also accepted)
  title   merchant text as printed on the statement
  amount  signed decimal; positive = expense, zero or negative = payment/credit
          dot or comma decimals are accepted (quote values that contain a comma)

  Example:
    date,title,amount
    2024-05-01,UBER TRIP,23.50
    2024-06-02,Pagamento recebido,-450.00

How ingest works:
  Each export is parsed, normalized and merged into the stored ledger.
  A row with the same date, title (ignoring case and spacing) and amount as an
  existing row is a duplicate and is skipped, so overlapping exports are safe.
  Rows that cannot be parsed are listed with their row number and reason.

What to do next:
  1. Run `spendfold ingest --dry-run <paths..>` and fix any reported rows.
  2. Run `spendfold ingest <paths..>` to commit.
  3. Run `spendfold report categories` to see where the money went.
";

/// Extended help shown after `spendfold report --help`.
pub const REPORT_AFTER_HELP: &str = "\
Views:
  categories  totals per category, largest first
  entities    totals per merchant (normalized title), largest first
  top         largest expenses (--metric value) or most frequent merchants
              (--metric frequency), limited by --top
  pivot       every expense in the window, filtered and sorted
  months      totals per calendar month, with --budget overrun
  abc         merchants ranked by cumulative share (A <= 80%, B <= 95%, C)
  summary     totals, averages and date span

Windows:
  --horizon 7d|30d|90d|12m ends on --reference, or on the latest ledger date.
  --from/--to select an inclusive custom range instead.
";

#[derive(Debug, Parser)]
#[command(
    name = "spendfold",
    version,
    about = "consolidate credit-card exports into one categorized ledger",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Ledger directory (defaults to $SPENDFOLD_HOME, then ~/.spendfold)
    #[arg(long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Merge one or more card exports into the ledger
    #[command(after_help = INGEST_AFTER_HELP)]
    Ingest {
        /// Export files to ingest, merged in the order given
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,
        /// Validate and report without writing the ledger
        #[arg(long)]
        dry_run: bool,
        /// Category rules file (TOML); defaults to the bundled rules
        #[arg(long, value_name = "PATH")]
        rules: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List committed ingests
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compute an aggregate view over a window of the ledger
    #[command(after_help = REPORT_AFTER_HELP)]
    Report {
        #[arg(value_enum)]
        view: ReportView,
        #[command(flatten)]
        window: WindowArgs,
        /// Number of rows for the `top` view
        #[arg(long, default_value_t = 10)]
        top: usize,
        /// Ranking metric for the `top` view
        #[arg(long, value_enum, default_value_t = MetricArg::Value)]
        metric: MetricArg,
        /// Sort key for the `pivot` view
        #[arg(long, value_enum, default_value_t = SortArg::Date)]
        sort: SortArg,
        /// Sort descending (pivot)
        #[arg(long)]
        desc: bool,
        /// Only rows in this category (pivot)
        #[arg(long)]
        category: Option<String>,
        /// Only rows whose title contains this text (pivot)
        #[arg(long)]
        search: Option<String>,
        /// Include payments and credits (pivot)
        #[arg(long)]
        include_non_expense: bool,
        /// Monthly budget used to flag overruns (months)
        #[arg(long)]
        budget: Option<String>,
        /// Category rules file (TOML); defaults to the bundled rules
        #[arg(long, value_name = "PATH")]
        rules: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the consolidated record set and expense table for a window
    Export {
        /// Directory for consolidated.json and consolidated_expenses.csv
        #[arg(long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,
        #[command(flatten)]
        window: WindowArgs,
        /// Category rules file (TOML); defaults to the bundled rules
        #[arg(long, value_name = "PATH")]
        rules: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Args, Default)]
pub struct WindowArgs {
    /// Trailing horizon: 7d, 30d, 90d or 12m (default 12m)
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub horizon: Option<String>,
    /// Custom window start (inclusive)
    #[arg(long, requires = "to")]
    pub from: Option<String>,
    /// Custom window end (inclusive)
    #[arg(long, requires = "from")]
    pub to: Option<String>,
    /// Reference date the horizon ends on (defaults to the latest ledger date)
    #[arg(long)]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportView {
    Categories,
    Entities,
    Top,
    Pivot,
    Months,
    Abc,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    Value,
    Frequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Date,
    Amount,
    Title,
    Category,
}

pub fn parse_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

#[cfg(test)]
mod tests {
    use super::{Commands, MetricArg, ReportView, SortArg, parse_from};

    #[test]
    fn ingest_accepts_multiple_paths_and_dry_run() {
        let parsed = parse_from(["spendfold", "ingest", "--dry-run", "a.csv", "b.csv"]);
        assert!(parsed.is_ok());
        assert!(matches!(
            parsed,
            Ok(ref cli) if matches!(cli.command, Commands::Ingest { .. })
        ));
        if let Ok(cli) = parsed
            && let Commands::Ingest { paths, dry_run, .. } = cli.command
        {
            assert_eq!(paths.len(), 2);
            assert!(dry_run);
        }
    }

    #[test]
    fn ingest_requires_a_path() {
        assert!(parse_from(["spendfold", "ingest"]).is_err());
    }

    #[test]
    fn report_parses_view_and_flags() {
        let parsed = parse_from([
            "spendfold",
            "report",
            "top",
            "--top",
            "3",
            "--metric",
            "frequency",
            "--horizon",
            "90d",
            "--json",
        ]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed
            && let Commands::Report {
                view,
                top,
                metric,
                window,
                json,
                ..
            } = cli.command
        {
            assert_eq!(view, ReportView::Top);
            assert_eq!(top, 3);
            assert_eq!(metric, MetricArg::Frequency);
            assert_eq!(window.horizon.as_deref(), Some("90d"));
            assert!(json);
        }
    }

    #[test]
    fn pivot_defaults_to_ascending_date_sort() {
        let parsed = parse_from(["spendfold", "report", "pivot"]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed
            && let Commands::Report { sort, desc, .. } = cli.command
        {
            assert_eq!(sort, SortArg::Date);
            assert!(!desc);
        }
    }

    #[test]
    fn horizon_conflicts_with_custom_range() {
        let parsed = parse_from([
            "spendfold",
            "report",
            "summary",
            "--horizon",
            "7d",
            "--from",
            "2024-01-01",
            "--to",
            "2024-02-01",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn custom_range_needs_both_bounds() {
        assert!(parse_from(["spendfold", "report", "summary", "--from", "2024-01-01"]).is_err());
    }

    #[test]
    fn home_is_accepted_after_the_subcommand() {
        let parsed = parse_from(["spendfold", "history", "--home", "/tmp/ledger"]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            assert!(cli.home.is_some());
        }
    }

    #[test]
    fn unknown_view_is_rejected() {
        assert!(parse_from(["spendfold", "report", "forecast"]).is_err());
    }
}
