//! Application configuration and user preferences.
//!
//! Two small JSON files live in the data directory: `config.json` (log level
//! and where the preferences file is) and the preferences file itself (where
//! the address book is and how many undo steps to keep). A missing file is
//! written out with defaults; a broken one is reported and replaced by
//! defaults in memory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

pub const DATA_DIR_NAME: &str = ".contacts";
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default tracing filter, overridden by `RUST_LOG`.
    pub log_level: String,
    pub user_prefs_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: "info".to_string(),
            user_prefs_file: PathBuf::from("preferences.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPrefs {
    pub address_book_file: PathBuf,
    pub undo_limit: usize,
}

impl Default for UserPrefs {
    fn default() -> Self {
        UserPrefs {
            address_book_file: PathBuf::from("data").join("contacts.json"),
            undo_limit: 100,
        }
    }
}

/// `~/.contacts`.
pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(DATA_DIR_NAME))
        .ok_or(ConfigError::NoHomeDir)
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Read a JSON settings file.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let buf = fs::read_to_string(path)?;
    serde_json::from_str(&buf)
        .map(Some)
        .map_err(|source| ConfigError::Invalid { path: path.to_path_buf(), source })
}

pub fn write_json_file<T: Serialize>(value: &T, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(value)
        .map_err(|source| ConfigError::Invalid { path: path.to_path_buf(), source })?;
    fs::write(path, data)?;
    Ok(())
}

/// Load a settings file, creating it with defaults when missing.
///
/// Unreadable files fall back to defaults and leave the file on disk alone
/// so the user can fix it.
pub fn load_or_init<T>(path: &Path) -> T
where
    T: DeserializeOwned + Serialize + Default,
{
    match read_json_file::<T>(path) {
        Ok(Some(value)) => value,
        Ok(None) => {
            let value = T::default();
            if let Err(e) = write_json_file(&value, path) {
                warn!(path = %path.display(), error = %e, "could not write default settings");
            }
            value
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "using default settings");
            T::default()
        }
    }
}

/// Everything resolved at startup: where things live and how to behave.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub config: Config,
    pub prefs: UserPrefs,
    pub book_path: PathBuf,
}

impl Settings {
    /// Load config and preferences. `config_path` overrides
    /// `<data_dir>/config.json`, and `book_override` overrides the book location
    /// from the preferences.
    pub fn load(data_dir: &Path, config_path: Option<&Path>, book_override: Option<&Path>) -> Self {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| data_dir.join(CONFIG_FILE_NAME));
        let config: Config = load_or_init(&config_path);
        let prefs_path = resolve(data_dir, &config.user_prefs_file);
        let prefs: UserPrefs = load_or_init(&prefs_path);
        let book_path = match book_override {
            Some(p) => p.to_path_buf(),
            None => resolve(data_dir, &prefs.address_book_file),
        };
        Settings { data_dir: data_dir.to_path_buf(), config, prefs, book_path }
    }
}
