//! SQLite-backed progress storage

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use rusqlite_migration::{M, Migrations};

use super::{SyncStateStore, WatermarkStore};
use crate::models::{FolderId, SyncToken, epoch};

/// Database migrations
///
/// Each migration is applied in order. The user_version pragma tracks which
/// migrations have been applied.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // Migration 1: Initial schema
        M::up(
            r#"
            -- Continuation token per (user, folder)
            CREATE TABLE folder_sync_state (
                user_name TEXT NOT NULL,
                folder_id TEXT NOT NULL,
                token TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (user_name, folder_id)
            );

            -- Last successful sync per user, epoch milliseconds
            CREATE TABLE user_watermark (
                user_name TEXT PRIMARY KEY,
                synced_at_ms INTEGER NOT NULL
            );
            "#,
        ),
    ])
}

/// SQLite store holding both sync tokens and watermarks
///
/// One connection serves every folder worker; calls are serialized
/// through a mutex.
pub struct SqliteProgressStore {
    conn: Mutex<Connection>,
}

impl SqliteProgressStore {
    /// Open (or create) the progress database at `db_path`
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref())
            .with_context(|| format!("Failed to open database at {:?}", db_path.as_ref()))?;

        // WAL lets a reader inspect progress while a run is writing it
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            "#,
        )?;

        Self::with_connection(conn)
    }

    /// Private database that disappears with the store
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::with_connection(conn)
    }

    fn with_connection(mut conn: Connection) -> Result<Self> {
        migrations()
            .to_latest(&mut conn)
            .context("Failed to run database migrations")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("progress database lock poisoned"))
    }

    /// Forget all progress for a user so the next run starts from scratch
    pub fn reset_user(&self, user: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM folder_sync_state WHERE user_name = ?", [user])?;
        conn.execute("DELETE FROM user_watermark WHERE user_name = ?", [user])?;
        Ok(())
    }

    /// Folders with a stored token for a user, ordered by folder id
    pub fn list_folders(&self, user: &str) -> Result<Vec<FolderId>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT folder_id FROM folder_sync_state WHERE user_name = ? ORDER BY folder_id",
        )?;
        let folders = stmt
            .query_map([user], |row| row.get::<_, String>(0))?
            .map(|id| id.map(FolderId::new))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(folders)
    }
}

impl SyncStateStore for SqliteProgressStore {
    fn get_token(&self, user: &str, folder: &FolderId) -> Result<SyncToken> {
        let conn = self.conn()?;
        let token: Option<String> = conn
            .query_row(
                "SELECT token FROM folder_sync_state WHERE user_name = ? AND folder_id = ?",
                params![user, folder.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(token.map(SyncToken::new).unwrap_or_default())
    }

    fn put_token(&self, user: &str, folder: &FolderId, token: &SyncToken) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO folder_sync_state (user_name, folder_id, token, updated_at)
             VALUES (?, ?, ?, ?)",
            params![user, folder.as_str(), token.as_str(), Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

impl WatermarkStore for SqliteProgressStore {
    fn get_watermark(&self, user: &str) -> Result<DateTime<Utc>> {
        let conn = self.conn()?;
        let millis: Option<i64> = conn
            .query_row(
                "SELECT synced_at_ms FROM user_watermark WHERE user_name = ?",
                [user],
                |row| row.get(0),
            )
            .optional()?;

        let Some(millis) = millis else {
            return Ok(epoch());
        };
        DateTime::from_timestamp_millis(millis)
            .with_context(|| format!("Stored watermark for {user} is out of range: {millis}"))
    }

    fn put_watermark(&self, user: &str, at: DateTime<Utc>) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO user_watermark (user_name, synced_at_ms) VALUES (?, ?)",
            params![user, at.timestamp_millis()],
        )?;
        Ok(())
    }
}
