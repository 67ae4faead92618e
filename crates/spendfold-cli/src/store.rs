use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use spendfold_core::ledger::Ledger;
use spendfold_core::{CoreError, CoreResult};
use tracing::debug;

pub const HOME_ENV_VAR: &str = "SPENDFOLD_HOME";
const LEDGER_FILE_NAME: &str = "ledger.json";
const STORE_FORMAT_VERSION: u32 = 1;

/// One committed ingest as remembered by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestRecord {
    pub ingest_id: String,
    pub created_at: String,
    pub sources: Vec<String>,
    pub rows_read: i64,
    pub rows_invalid: i64,
    pub inserted: i64,
    pub deduped: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreState {
    #[serde(default = "current_format_version")]
    pub version: u32,
    #[serde(default)]
    pub ingests: Vec<IngestRecord>,
    #[serde(default)]
    pub ledger: Ledger,
}

fn current_format_version() -> u32 {
    STORE_FORMAT_VERSION
}

pub fn resolve_ledger_home(home_override: Option<&Path>) -> CoreResult<PathBuf> {
    let candidate = match home_override {
        Some(path) => path.to_path_buf(),
        None => {
            if let Some(override_path) = std::env::var_os(HOME_ENV_VAR) {
                PathBuf::from(override_path)
            } else if let Some(home_path) = home::home_dir() {
                home_path.join(".spendfold")
            } else {
                return Err(CoreError::ledger_read_failed(
                    Path::new("."),
                    "Could not resolve a home directory for the ledger.",
                ));
            }
        }
    };

    absolutize(&candidate)
}

pub fn ledger_file_path(home: &Path) -> PathBuf {
    home.join(LEDGER_FILE_NAME)
}

/// Reads the store at `home`. A missing file is an empty ledger.
pub fn load(home: &Path) -> CoreResult<StoreState> {
    let path = ledger_file_path(home);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no ledger yet; starting empty");
            return Ok(StoreState {
                version: STORE_FORMAT_VERSION,
                ..StoreState::default()
            });
        }
        Err(error) => return Err(CoreError::ledger_read_failed(&path, &error.to_string())),
    };

    let state: StoreState = serde_json::from_str(&text)
        .map_err(|error| CoreError::ledger_corrupt(&path, &error.to_string()))?;
    debug!(
        path = %path.display(),
        transactions = state.ledger.len(),
        ingests = state.ingests.len(),
        "loaded ledger"
    );
    Ok(state)
}

/// Writes the whole store through a sibling temp file and a rename. A failed
/// write leaves the previous ledger in place.
pub fn save(home: &Path, state: &StoreState) -> CoreResult<()> {
    ensure_ledger_directory(home)?;
    let path = ledger_file_path(home);
    let staging = home.join(format!("{LEDGER_FILE_NAME}.tmp"));

    let body = serde_json::to_string_pretty(state)
        .map_err(|error| CoreError::internal_serialization(&error.to_string()))?;
    fs::write(&staging, body)
        .map_err(|error| CoreError::ledger_write_failed(&staging, &error.to_string()))?;
    fs::rename(&staging, &path)
        .map_err(|error| CoreError::ledger_write_failed(&path, &error.to_string()))?;

    debug!(
        path = %path.display(),
        transactions = state.ledger.len(),
        "saved ledger"
    );
    Ok(())
}

pub fn ensure_ledger_directory(path: &Path) -> CoreResult<()> {
    fs::create_dir_all(path)
        .map_err(|error| CoreError::ledger_write_failed(path, &error.to_string()))?;
    set_private_permissions_best_effort(path);
    Ok(())
}

fn absolutize(path: &Path) -> CoreResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|error| CoreError::ledger_read_failed(path, &error.to_string()))
}

#[cfg(unix)]
fn set_private_permissions_best_effort(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o700));
}

#[cfg(not(unix))]
fn set_private_permissions_best_effort(_path: &Path) {}
