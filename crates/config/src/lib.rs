//! Configuration file helpers for mailsync
//!
//! Configuration lives in the shared mailsync config directory
//! (`~/.config/mailsync/` by default). The directory can be relocated with
//! the `MAILSYNC_CONFIG_DIR` environment variable, which deployments use to
//! keep one directory per mirrored tenant.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Directory name under the platform config directory
pub const APP_DIR: &str = "mailsync";

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "MAILSYNC_CONFIG_DIR";

/// Get the mailsync config directory
///
/// `MAILSYNC_CONFIG_DIR` wins over the platform default.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|p| p.join(APP_DIR))
}

/// Get the path to a file within the config directory
pub fn config_path(filename: &str) -> Option<PathBuf> {
    config_dir().map(|p| p.join(filename))
}

/// Check if a config file exists in the config directory
pub fn config_exists(filename: &str) -> bool {
    config_path(filename).is_some_and(|p| p.exists())
}

/// Load and parse a JSON file from the config directory
pub fn load_json<T: DeserializeOwned>(filename: &str) -> Result<T> {
    let path = config_path(filename).context("Could not determine config directory")?;
    load_json_file(&path)
}

/// Load and parse a JSON file from an arbitrary path
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Ensure the config directory exists, returning its path
pub fn ensure_config_dir() -> Result<PathBuf> {
    let dir = config_dir().context("Could not determine config directory")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    Ok(dir)
}

/// Save a value as pretty JSON into the config directory
pub fn save_json<T: Serialize>(filename: &str, value: &T) -> Result<()> {
    let dir = ensure_config_dir()?;
    save_json_file(&dir.join(filename), value)
}

/// Save a value as pretty JSON to an arbitrary path
pub fn save_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        id_page_size: i64,
        users: Vec<String>,
    }

    #[test]
    fn test_config_path_is_inside_config_dir() {
        let dir = config_dir().unwrap();
        let path = config_path("sync.json").unwrap();
        assert_eq!(path.parent(), Some(dir.as_path()));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.json");
        let sample = Sample {
            id_page_size: 128,
            users: vec!["bkerr".to_string()],
        };

        save_json_file(&path, &sample).unwrap();
        let loaded: Sample = load_json_file(&path).unwrap();
        assert_eq!(loaded, sample);
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = load_json_file::<Sample>(&path).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_json_file::<Sample>(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config file"));
    }
}
