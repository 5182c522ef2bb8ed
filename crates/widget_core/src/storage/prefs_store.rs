//! Read-only access to the key-value preferences file shared with the main app.

use crate::error::AppError;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const DEFAULT_STORE_KEY: &str = "flutter.todos";
const PREFS_FILE_NAME: &str = "shared_prefs.json";
const PREFS_ENV_VAR: &str = "TODOWIDGET_PREFS_PATH";

pub fn prefs_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(PREFS_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("todowidget")
            .join(PREFS_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("todowidget")
            .join(PREFS_FILE_NAME))
    }
}

/// Fetch the serialized task blob stored under `key`.
///
/// A missing file, a missing key and an explicit `null` all mean "nothing
/// stored" and yield `Ok(None)`.
pub fn load_blob(path: &Path, key: &str) -> Result<Option<String>, AppError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let prefs: Map<String, Value> = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;

    match prefs.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(blob)) => Ok(Some(blob.clone())),
        Some(_) => Err(AppError::invalid_data(format!(
            "value for '{key}' is not a string"
        ))),
    }
}
