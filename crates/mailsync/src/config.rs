//! Sync configuration
//!
//! Supports loading settings from (in order of priority):
//! 1. JSON file (`~/.config/mailsync/sync.json`)
//! 2. Runtime environment variables
//! 3. Built-in defaults

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings filename in the mailsync config directory
const CONFIG_FILE: &str = "sync.json";

pub const DEFAULT_ID_PAGE_SIZE: i64 = 512;
pub const DEFAULT_ITEM_PAGE_SIZE: i64 = 50;
pub const DEFAULT_FOLDER_WORKERS: usize = 4;
/// Upper bound on folder workers; each one is an OS thread
pub const MAX_FOLDER_WORKERS: usize = 64;

/// Settings that shape the requests a sync run makes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    id_page_size: u32,
    item_page_size: u32,
    folder_workers: usize,
}

/// On-disk settings file; every field is optional
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncConfigFile {
    id_page_size: Option<i64>,
    item_page_size: Option<i64>,
    folder_workers: Option<i64>,
}

impl SyncConfig {
    /// Page sizes below one make no sense and are raised to one
    pub fn new(id_page_size: i64, item_page_size: i64) -> Self {
        Self {
            id_page_size: clamp_page_size(id_page_size),
            item_page_size: clamp_page_size(item_page_size),
            folder_workers: DEFAULT_FOLDER_WORKERS,
        }
    }

    /// Number of folders synced at once for a single user, between 1 and
    /// [`MAX_FOLDER_WORKERS`]
    pub fn with_folder_workers(mut self, workers: usize) -> Self {
        self.folder_workers = workers.clamp(1, MAX_FOLDER_WORKERS);
        self
    }

    /// Item ids requested per sync page, before the server cap is applied
    pub fn id_page_size(&self) -> u32 {
        self.id_page_size
    }

    /// Items fetched per content request by the downstream fetch step
    pub fn item_page_size(&self) -> u32 {
        self.item_page_size
    }

    pub fn folder_workers(&self) -> usize {
        self.folder_workers
    }

    /// Load settings using the following priority:
    /// 1. JSON file (~/.config/mailsync/sync.json)
    /// 2. Runtime environment variables, falling back to defaults
    pub fn load() -> Result<Self> {
        if config::config_exists(CONFIG_FILE) {
            let file: SyncConfigFile = config::load_json(CONFIG_FILE)?;
            return Ok(Self::from_config_file(file));
        }
        Self::from_env()
    }

    /// Load settings from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file: SyncConfigFile = config::load_json_file(path)?;
        Ok(Self::from_config_file(file))
    }

    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let file: SyncConfigFile =
            serde_json::from_str(json).context("Failed to parse sync settings JSON")?;
        Ok(Self::from_config_file(file))
    }

    /// Load settings from MAILSYNC_* environment variables
    ///
    /// Unset variables take their defaults; set but unparsable ones are errors.
    pub fn from_env() -> Result<Self> {
        let file = SyncConfigFile {
            id_page_size: env_i64("MAILSYNC_ID_PAGE_SIZE")?,
            item_page_size: env_i64("MAILSYNC_ITEM_PAGE_SIZE")?,
            folder_workers: env_i64("MAILSYNC_FOLDER_WORKERS")?,
        };
        Ok(Self::from_config_file(file))
    }

    /// Write these settings to the mailsync config directory
    pub fn save(&self) -> Result<()> {
        config::save_json(CONFIG_FILE, &self.to_config_file())
    }

    fn from_config_file(file: SyncConfigFile) -> Self {
        let workers = file
            .folder_workers
            .map(|w| usize::try_from(w.max(1)).unwrap_or(MAX_FOLDER_WORKERS))
            .unwrap_or(DEFAULT_FOLDER_WORKERS);

        Self::new(
            file.id_page_size.unwrap_or(DEFAULT_ID_PAGE_SIZE),
            file.item_page_size.unwrap_or(DEFAULT_ITEM_PAGE_SIZE),
        )
        .with_folder_workers(workers)
    }

    fn to_config_file(&self) -> SyncConfigFile {
        SyncConfigFile {
            id_page_size: Some(self.id_page_size.into()),
            item_page_size: Some(self.item_page_size.into()),
            folder_workers: i64::try_from(self.folder_workers).ok(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ID_PAGE_SIZE, DEFAULT_ITEM_PAGE_SIZE)
    }
}

fn clamp_page_size(size: i64) -> u32 {
    size.clamp(1, i64::from(u32::MAX)) as u32
}

fn env_i64(name: &str) -> Result<Option<i64>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} is not an integer: {value:?}")),
        Err(_) => Ok(None),
    }
}
