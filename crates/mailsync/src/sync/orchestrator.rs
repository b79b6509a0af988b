//! Per-user sync runs

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::time::Instant;

use crate::config::SyncConfig;
use crate::error::{ErrorKind, Result, SyncError};
use crate::exchange::{CancelToken, ItemSyncPaginator, Transport, discover_all};
use crate::models::{FolderId, FolderRoot, FolderSyncResult, ItemId, advance_watermark};
use crate::storage::{SyncStateStore, WatermarkStore};

/// Outcome of a successful sync run for one user
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub user: String,
    /// One entry per discovered folder, ordered by folder id
    pub folders: Vec<FolderSyncResult>,
    /// Watermark written at the end of the run
    pub watermark: DateTime<Utc>,
    /// Duration of the run
    pub duration_ms: u64,
}

impl SyncReport {
    /// New items across all folders
    pub fn total_items(&self) -> usize {
        self.folders.iter().map(|f| f.item_ids.len()).sum()
    }

    /// Sync requests issued across all folders
    pub fn total_requests(&self) -> usize {
        self.folders.iter().map(|f| f.requests).sum()
    }

    pub fn item_ids(&self) -> impl Iterator<Item = &ItemId> {
        self.folders.iter().flat_map(|f| f.item_ids.iter())
    }

    pub fn folder(&self, id: &FolderId) -> Option<&FolderSyncResult> {
        self.folders.iter().find(|f| &f.folder == id)
    }
}

/// Drives folder discovery and item sync for users, recording progress
///
/// Folders of one user are synced in parallel on a bounded pool; the pages
/// of a single folder are always fetched in sequence. Each folder's token is
/// persisted as soon as that folder finishes, while the user's watermark is
/// written once, only after every folder succeeded.
///
/// When any folder fails the run returns [`SyncError::Incomplete`], which
/// carries the results of the folders that did finish. Their tokens are
/// already stored, so a retry will not report those ids again.
pub struct SyncOrchestrator<'a> {
    transport: &'a dyn Transport,
    sync_states: &'a dyn SyncStateStore,
    watermarks: &'a dyn WatermarkStore,
    config: SyncConfig,
    cancel: CancelToken,
    pool: rayon::ThreadPool,
}

impl<'a> SyncOrchestrator<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        sync_states: &'a dyn SyncStateStore,
        watermarks: &'a dyn WatermarkStore,
        config: SyncConfig,
    ) -> anyhow::Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.folder_workers())
            .thread_name(|i| format!("mailsync-folder-{i}"))
            .build()?;

        Ok(Self {
            transport,
            sync_states,
            watermarks,
            config,
            cancel: CancelToken::new(),
            pool,
        })
    }

    /// Share `cancel` with the caller so it can stop a run between pages
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Sync every folder beneath `roots` for `user`, stamping the watermark with the current time
    pub fn sync_user(&self, user: &str, roots: &[FolderRoot]) -> Result<SyncReport> {
        self.run(user, roots, None)
    }

    /// Like [`sync_user`](Self::sync_user) with the watermark stamped at `now`
    pub fn sync_user_at(
        &self,
        user: &str,
        roots: &[FolderRoot],
        now: DateTime<Utc>,
    ) -> Result<SyncReport> {
        self.run(user, roots, Some(now))
    }

    /// Sync users one after another
    ///
    /// A failed user does not stop the ones after it.
    pub fn sync_users<S: AsRef<str>>(
        &self,
        users: &[S],
        roots: &[FolderRoot],
    ) -> Vec<(String, Result<SyncReport>)> {
        users
            .iter()
            .map(|user| {
                let user = user.as_ref();
                (user.to_string(), self.sync_user(user, roots))
            })
            .collect()
    }

    fn run(
        &self,
        user: &str,
        roots: &[FolderRoot],
        now: Option<DateTime<Utc>>,
    ) -> Result<SyncReport> {
        let start = Instant::now();
        self.cancel.check()?;

        // Without a folder list there is nothing to iterate
        let folders: Vec<FolderId> = discover_all(self.transport, roots, user)?
            .into_iter()
            .collect();
        info!("Syncing {} folders for {}", folders.len(), user);

        let outcomes: Vec<Result<FolderSyncResult>> = self.pool.install(|| {
            folders
                .par_iter()
                .map(|folder| self.sync_folder(user, folder))
                .collect()
        });

        let mut results = Vec::with_capacity(folders.len());
        let mut failures = Vec::new();
        for (folder, outcome) in folders.iter().zip(outcomes) {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Sync of folder {} for {} failed: {}", folder, user, e);
                    failures.push(e.in_folder(folder));
                }
            }
        }

        if !failures.is_empty() {
            warn!(
                "{} of {} folders failed for {}; watermark not advanced",
                failures.len(),
                folders.len(),
                user
            );
            // Report a real failure rather than the cancellations it may have caused
            let index = failures
                .iter()
                .position(|e| e.kind() != ErrorKind::Cancelled)
                .unwrap_or(0);
            return Err(SyncError::Incomplete {
                completed: results,
                source: Box::new(failures.swap_remove(index)),
            });
        }

        let previous = self.watermarks.get_watermark(user)?;
        let watermark = advance_watermark(previous, now.unwrap_or_else(Utc::now));
        self.watermarks.put_watermark(user, watermark)?;

        let report = SyncReport {
            user: user.to_string(),
            folders: results,
            watermark,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            "Synced {}: {} new items across {} folders in {}ms",
            user,
            report.total_items(),
            report.folders.len(),
            report.duration_ms
        );
        Ok(report)
    }

    /// Runs one folder to exhaustion; the token is persisted only when it gets there
    fn sync_folder(&self, user: &str, folder: &FolderId) -> Result<FolderSyncResult> {
        let prior = self.sync_states.get_token(user, folder)?;
        debug!(
            "Folder {} for {} starting from {}",
            folder,
            user,
            if prior.is_initial() { "the beginning" } else { "stored state" }
        );

        let result = ItemSyncPaginator::new(self.transport, &self.config)
            .with_cancel(self.cancel.clone())
            .sync_folder(folder, user, prior)?;

        self.sync_states.put_token(user, folder, &result.token)?;
        Ok(result)
    }
}

/// Whether re-invoking a failed run may succeed without outside changes
///
/// The engine never retries on its own. Callers layering a retry policy on
/// top of [`SyncOrchestrator::sync_user`] can use this to skip rejected
/// requests and cancelled runs, which fail the same way until something
/// outside the engine changes.
pub fn is_retryable(error: &SyncError) -> bool {
    matches!(
        error.kind(),
        ErrorKind::Transport | ErrorKind::EmptyResponse | ErrorKind::Store
    )
}
