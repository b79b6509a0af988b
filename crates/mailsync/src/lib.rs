//! Mailsync - incremental mirror of a remote mailbox hierarchy
//!
//! This crate provides the synchronization engine:
//! - Folder discovery beneath well-known or explicit roots
//! - Bounded-page item sync driven by opaque continuation tokens
//! - Per-user watermarks advanced only after a fully successful run
//! - Store abstractions for tokens and watermarks (in-memory, SQLite)
//! - A typed error taxonomy callers branch on to decide what happens next
//!
//! Fetching message contents for the synced item ids is left to the caller.

pub mod config;
pub mod error;
pub mod exchange;
pub mod models;
pub mod storage;
pub mod sync;

pub use config::SyncConfig;
pub use error::{ErrorKind, Result, SyncError};
pub use exchange::{
    CancelToken, HttpTransport, ItemSyncPaginator, MAX_SYNC_COUNT, Transport, discover_all,
    discover_folders,
};
pub use models::{
    DistinguishedFolder, FolderId, FolderRoot, FolderSyncResult, ItemId, PageResult, SyncToken,
};
pub use storage::{
    InMemorySyncStateStore, InMemoryWatermarkStore, NoopWatermarkStore, SqliteProgressStore,
    SyncStateStore, WatermarkStore,
};
pub use sync::{SyncOrchestrator, SyncReport, is_retryable};
