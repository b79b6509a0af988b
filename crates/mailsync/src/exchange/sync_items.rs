//! Paged item sync for a single folder

use log::{debug, trace, warn};

use super::api::{BaseShape, SyncFolderItemsRequest};
use super::{CancelToken, Transport};
use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::models::{FolderId, FolderSyncResult, PageResult, SyncToken};

/// Largest page the server accepts; asking for more makes it fault
pub const MAX_SYNC_COUNT: u32 = 512;

/// Build a request for the changes in `folder` since `token`
pub fn sync_folder_items_request(
    config: &SyncConfig,
    folder: &FolderId,
    token: &SyncToken,
) -> SyncFolderItemsRequest {
    SyncFolderItemsRequest {
        item_shape: BaseShape::IdOnly,
        sync_folder_id: folder.clone(),
        sync_state: token.to_request(),
        max_changes_returned: config.id_page_size().min(MAX_SYNC_COUNT),
    }
}

/// Pulls new item ids from a folder, one bounded page at a time
///
/// Each request depends on the token returned by the one before it, so the
/// pages of a folder are always fetched strictly in sequence.
pub struct ItemSyncPaginator<'a> {
    transport: &'a dyn Transport,
    config: &'a SyncConfig,
    cancel: CancelToken,
}

impl<'a> ItemSyncPaginator<'a> {
    pub fn new(transport: &'a dyn Transport, config: &'a SyncConfig) -> Self {
        Self {
            transport,
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Stop between pages once `cancel` fires
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Issue one sync request for `folder` starting at `token`
    ///
    /// Only created items are collected; updates and deletes are not
    /// mirrored. A message with any status other than `NoError` fails the
    /// whole page and none of its items are returned. A response with no
    /// messages at all is treated as the last page so a degenerate server
    /// reply cannot keep the loop running.
    pub fn sync_page(&self, folder: &FolderId, user: &str, token: &SyncToken) -> Result<PageResult> {
        self.cancel.check()?;

        let request = sync_folder_items_request(self.config, folder, token);
        trace!(
            "Sync request for {} as {}: {} changes from {:?}",
            folder, user, request.max_changes_returned, request.sync_state
        );
        let response = self.transport.sync_folder_items(request, user)?;

        let mut page = PageResult::starting_from(token);
        if response.response_messages.is_empty() {
            debug!("Server responded to sync of {} without any messages", folder);
            page.includes_last_item = true;
            return Ok(page);
        }

        for message in response.response_messages {
            if let Some(code) = message.response_code
                && !code.is_success()
            {
                warn!(
                    "Sync of {} for {} rejected: {} {}",
                    folder,
                    user,
                    code,
                    message.message_text.as_deref().unwrap_or_default()
                );
                return Err(SyncError::rejected(code));
            }
            if let Some(state) = message.sync_state {
                page.token = SyncToken::new(state);
            }
            if let Some(last) = message.includes_last_item_in_range {
                page.includes_last_item = last;
            }
            if let Some(changes) = message.changes {
                page.item_ids
                    .extend(changes.create.into_iter().filter_map(|change| change.item_id));
            }
        }

        Ok(page)
    }

    /// Page through `folder` from `prior` until the server reports the last item
    ///
    /// At least one request is always made, even for a folder with no
    /// changes. Nothing is persisted here. On error the accumulated ids are dropped
    /// and the caller still holds `prior`.
    pub fn sync_folder(&self, folder: &FolderId, user: &str, prior: SyncToken) -> Result<FolderSyncResult> {
        let mut result = FolderSyncResult {
            folder: folder.clone(),
            item_ids: Vec::new(),
            token: prior,
            requests: 0,
        };

        loop {
            let page = self.sync_page(folder, user, &result.token)?;
            result.requests += 1;
            result.item_ids.extend(page.item_ids);
            result.token = page.token;

            if page.includes_last_item {
                break;
            }
        }

        debug!(
            "Synced {} for {}: {} new items in {} requests",
            folder,
            user,
            result.item_ids.len(),
            result.requests
        );
        Ok(result)
    }
}
