use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::{TempDir, tempdir};

const MAY_EXPORT: &str = "\
date,title,amount
2024-05-01,UBER TRIP,23.50
2024-05-03,Supermercado Dia,180.00
2024-05-10,Pagamento recebido,-450.00
";

const JUNE_EXPORT: &str = "\
title,amount,date
Uber   Trip,23.50,2024-05-01
POSTO SHELL,200.00,2024-06-02
Padaria Real,abc,2024-06-03
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Option<Self> {
        let dir = tempdir().ok()?;
        fs::write(dir.path().join("may.csv"), MAY_EXPORT).ok()?;
        fs::write(dir.path().join("june.csv"), JUNE_EXPORT).ok()?;
        Some(Self { dir })
    }

    fn home(&self) -> std::path::PathBuf {
        self.dir.path().join("home")
    }

    fn file(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }

    fn run(&self, args: &[&str]) -> (i32, String) {
        run_cli(&self.home(), args)
    }

    fn run_json(&self, args: &[&str]) -> (i32, Value) {
        let mut full = args.to_vec();
        full.push("--json");
        let (code, stdout) = self.run(&full);
        let value = serde_json::from_str(&stdout).unwrap_or(Value::Null);
        (code, value)
    }
}

fn run_cli(home: &Path, args: &[&str]) -> (i32, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_spendfold"))
        .args(args)
        .env("SPENDFOLD_HOME", home)
        .env_remove("SPENDFOLD_LOG")
        .output();
    assert!(output.is_ok());
    match output {
        Ok(output) => (
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stdout).into_owned(),
        ),
        Err(_) => (-1, String::new()),
    }
}

#[test]
fn ingest_merges_overlapping_exports_and_reports_the_skipped_row() {
    let fixture = Fixture::new();
    assert!(fixture.is_some());
    if let Some(fixture) = fixture {
        let (code, value) = fixture.run_json(&[
            "ingest",
            &fixture.file("may.csv"),
            &fixture.file("june.csv"),
        ]);
        assert_eq!(code, 0);
        assert_eq!(value["command"], "ingest");
        assert_eq!(value["data"]["summary"]["rows_read"], 6);
        assert_eq!(value["data"]["summary"]["rows_invalid"], 1);
        assert_eq!(value["data"]["summary"]["inserted"], 4);
        assert_eq!(value["data"]["summary"]["deduped"], 1);
        assert_eq!(value["data"]["skipped"][0]["field"], "amount");
        assert_eq!(value["data"]["skipped"][0]["row"], 3);
        assert_eq!(value["data"]["skipped"][0]["line"], 4);
        assert_eq!(value["data"]["duplicates"][0]["dedupe_reason"], "batch");
        assert_eq!(value["data"]["ledger"]["transactions"], 4);
        assert!(
            value["data"]["ingest_id"]
                .as_str()
                .is_some_and(|id| id.starts_with("ing_"))
        );

        let (code, again) = fixture.run_json(&["ingest", &fixture.file("may.csv")]);
        assert_eq!(code, 0);
        assert_eq!(again["data"]["summary"]["inserted"], 0);
        assert_eq!(again["data"]["duplicates"][0]["dedupe_reason"], "existing_ledger");

        let (code, history) = fixture.run_json(&["history"]);
        assert_eq!(code, 0);
        assert_eq!(history.as_array().map(Vec::len), Some(2));
    }
}

#[test]
fn dry_run_leaves_the_ledger_untouched() {
    let fixture = Fixture::new();
    assert!(fixture.is_some());
    if let Some(fixture) = fixture {
        let (code, text) = fixture.run(&["ingest", "--dry-run", &fixture.file("may.csv")]);
        assert_eq!(code, 0);
        assert!(text.contains("No rows were written because this was a dry run."));
        assert!(!fixture.home().join("ledger.json").exists());

        let (code, history) = fixture.run_json(&["history"]);
        assert_eq!(code, 0);
        assert_eq!(history, Value::Array(Vec::new()));
    }
}

#[test]
fn reports_follow_the_bundled_rules_and_window() {
    let fixture = Fixture::new();
    assert!(fixture.is_some());
    if let Some(fixture) = fixture {
        let (code, _) = fixture.run(&["ingest", &fixture.file("may.csv"), &fixture.file("june.csv")]);
        assert_eq!(code, 0);

        let (code, summary) = fixture.run_json(&["report", "summary"]);
        assert_eq!(code, 0);
        assert_eq!(summary["data"]["view"], "summary");
        assert_eq!(summary["data"]["rows"]["total_expenses"], "403.50");
        assert_eq!(summary["data"]["rows"]["transaction_count"], 3);
        assert_eq!(summary["data"]["window"]["end"], "2024-06-02");

        let (code, recent) = fixture.run_json(&["report", "pivot", "--horizon", "7d"]);
        assert_eq!(code, 0);
        let rows = recent["data"]["rows"].as_array().cloned().unwrap_or_default();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["title"], "POSTO SHELL");

        let (code, categories) = fixture.run_json(&["report", "categories"]);
        assert_eq!(code, 0);
        let names = categories["data"]["rows"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .iter()
            .filter_map(|row| row["category"].as_str().map(str::to_string))
            .collect::<Vec<_>>();
        assert!(names.contains(&"Alimentação / Supermercado".to_string()));
        assert!(!names.contains(&"payment".to_string()));
    }
}

#[test]
fn export_writes_json_and_expense_csv() {
    let fixture = Fixture::new();
    assert!(fixture.is_some());
    if let Some(fixture) = fixture {
        let (code, _) = fixture.run(&["ingest", &fixture.file("may.csv")]);
        assert_eq!(code, 0);

        let out_dir = fixture.file("out");
        let (code, text) = fixture.run(&["export", "--out-dir", &out_dir]);
        assert_eq!(code, 0);
        assert!(text.contains("Export completed successfully."));

        let json = fs::read_to_string(Path::new(&out_dir).join("consolidated.json"));
        assert!(json.is_ok());
        let mut expense_count = None;
        if let Ok(json) = json {
            let parsed: Result<Value, _> = serde_json::from_str(&json);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert_eq!(value["transactions"].as_array().map(Vec::len), Some(3));
                expense_count = value["meta"]["expense_count"].as_u64();
            }
        }
        assert_eq!(expense_count, Some(2));

        let csv = fs::read_to_string(Path::new(&out_dir).join("consolidated_expenses.csv"));
        assert!(csv.is_ok());
        if let Ok(csv) = csv {
            let lines = csv.lines().collect::<Vec<_>>();
            assert_eq!(lines[0], "date,title,amount,category");
            assert_eq!(Some(lines.len() as u64 - 1), expense_count);
            assert!(!csv.contains("Pagamento recebido"));
        }
    }
}

#[test]
fn bad_requests_exit_with_code_one_and_a_structured_error() {
    let fixture = Fixture::new();
    assert!(fixture.is_some());
    if let Some(fixture) = fixture {
        let (code, value) = fixture.run_json(&["report", "top", "--top", "0"]);
        assert_eq!(code, 1);
        assert_eq!(value["ok"], false);
        assert_eq!(value["error"]["code"], "invalid_top_n");

        let (code, value) =
            fixture.run_json(&["report", "summary", "--from", "2024-13-01", "--to", "2024-12-31"]);
        assert_eq!(code, 1);
        assert_eq!(value["error"]["code"], "invalid_range");

        let (code, value) = fixture.run_json(&["ingest", &fixture.file("missing.csv")]);
        assert_eq!(code, 1);
        assert_eq!(value["error"]["code"], "source_read_failed");

        let (code, text) = fixture.run(&["report", "nonsense"]);
        assert_eq!(code, 1);
        assert!(text.contains("invalid_argument"));
        assert!(text.contains("spendfold report --help"));
    }
}

#[test]
fn corrupt_ledger_exits_with_code_two() {
    let fixture = Fixture::new();
    assert!(fixture.is_some());
    if let Some(fixture) = fixture {
        assert!(fs::create_dir_all(fixture.home()).is_ok());
        assert!(fs::write(fixture.home().join("ledger.json"), "{not json").is_ok());

        let (code, value) = fixture.run_json(&["report", "summary"]);
        assert_eq!(code, 2);
        assert_eq!(value["error"]["code"], "ledger_corrupt");
    }
}

#[test]
fn bare_invocation_prints_root_help() {
    let dir = tempdir();
    assert!(dir.is_ok());
    if let Ok(dir) = dir {
        let (code, text) = run_cli(dir.path(), &[]);
        assert_eq!(code, 0);
        assert!(text.starts_with("Spendfold - consolidate credit-card exports"));
    }
}
