//! Storage trait definitions

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::models::{FolderId, SyncToken};

/// Continuation tokens keyed by (user, folder)
///
/// Entries for different folders are independent, so implementations must
/// tolerate concurrent calls from several folder workers.
pub trait SyncStateStore: Send + Sync {
    /// Token for a folder, or the initial token if it was never synced
    fn get_token(&self, user: &str, folder: &FolderId) -> Result<SyncToken>;

    /// Replace the token for a folder
    fn put_token(&self, user: &str, folder: &FolderId, token: &SyncToken) -> Result<()>;
}

/// Last successful sync time per user
pub trait WatermarkStore: Send + Sync {
    /// Watermark for a user, or the epoch if the user never completed a sync
    fn get_watermark(&self, user: &str) -> Result<DateTime<Utc>>;

    /// Replace the watermark for a user
    fn put_watermark(&self, user: &str, at: DateTime<Utc>) -> Result<()>;
}
