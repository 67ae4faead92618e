use crate::cli::Commands;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    let json = match command {
        Commands::Ingest { json, .. }
        | Commands::History { json }
        | Commands::Report { json, .. }
        | Commands::Export { json, .. } => *json,
    };
    if json {
        OutputMode::Json
    } else {
        OutputMode::Text
    }
}

#[cfg(test)]
mod tests {
    use super::{OutputMode, mode_for_command};
    use crate::cli::parse_from;

    #[test]
    fn mode_uses_json_for_ingest_with_json_flag() {
        let parsed = parse_from(["spendfold", "ingest", "--dry-run", "card.csv", "--json"]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            assert_eq!(mode_for_command(&cli.command), OutputMode::Json);
        }
    }

    #[test]
    fn mode_uses_json_for_report_and_history_with_json_flag() {
        let report = parse_from(["spendfold", "report", "abc", "--json"]);
        assert!(report.is_ok());
        if let Ok(cli) = report {
            assert_eq!(mode_for_command(&cli.command), OutputMode::Json);
        }

        let history = parse_from(["spendfold", "history", "--json"]);
        assert!(history.is_ok());
        if let Ok(cli) = history {
            assert_eq!(mode_for_command(&cli.command), OutputMode::Json);
        }
    }

    #[test]
    fn mode_uses_text_for_commands_without_json_flag() {
        let export = parse_from(["spendfold", "export", "--out-dir", "out"]);
        assert!(export.is_ok());
        if let Ok(cli) = export {
            assert_eq!(mode_for_command(&cli.command), OutputMode::Text);
        }

        let report = parse_from(["spendfold", "report", "pivot", "--sort", "amount"]);
        assert!(report.is_ok());
        if let Ok(cli) = report {
            assert_eq!(mode_for_command(&cli.command), OutputMode::Text);
        }
    }
}
