//! Transport capability and run cancellation

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::api::{
    FindFolderRequest, FindFolderResponse, RequestBody, ResponseBody, SyncFolderItemsRequest,
    SyncFolderItemsResponse,
};
use crate::error::{Result, SyncError};

/// Sends typed requests to the server on behalf of an impersonated user
///
/// Implementations own envelope encoding, delivery and timeouts. They report
/// delivery failures as [`SyncError::Transport`], a success status with a
/// blank body as [`SyncError::EmptyResponse`], and unparsable or bodiless
/// replies as [`SyncError::Protocol`].
pub trait Transport: Send + Sync {
    /// Send one request and wait for its response
    fn send(&self, request: &RequestBody, user: &str) -> Result<ResponseBody>;

    /// Send a FindFolder request, rejecting any other kind of response
    fn find_folder(&self, request: FindFolderRequest, user: &str) -> Result<FindFolderResponse> {
        match self.send(&RequestBody::FindFolder(request), user)? {
            ResponseBody::FindFolderResponse(response) => Ok(response),
            _ => Err(SyncError::protocol(
                "response did not contain a find folder response",
            )),
        }
    }

    /// Send a SyncFolderItems request, rejecting any other kind of response
    fn sync_folder_items(
        &self,
        request: SyncFolderItemsRequest,
        user: &str,
    ) -> Result<SyncFolderItemsResponse> {
        match self.send(&RequestBody::SyncFolderItems(request), user)? {
            ResponseBody::SyncFolderItemsResponse(response) => Ok(response),
            _ => Err(SyncError::protocol(
                "response did not contain a sync folder items response",
            )),
        }
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &RequestBody, user: &str) -> Result<ResponseBody> {
        (**self).send(request, user)
    }
}

/// Shared flag that stops pagination at the next page boundary
///
/// Clones observe the same flag. A folder whose loop is stopped keeps the
/// last token that was persisted for it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Fail with [`SyncError::Cancelled`] once cancelled
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(SyncError::Cancelled)
        } else {
            Ok(())
        }
    }
}
