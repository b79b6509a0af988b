//! Error taxonomy for sync operations
//!
//! Every failure the engine can hit is a [`SyncError`]. Callers decide what
//! to do next by branching on [`SyncError::kind`]; the engine itself never
//! retries.

use crate::exchange::api::ResponseCode;
use crate::models::{FolderId, FolderSyncResult};

/// Result alias used throughout the engine
pub type Result<T, E = SyncError> = std::result::Result<T, E>;

/// Broad category of a [`SyncError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Delivery failed: non-success status or no connection
    Transport,
    /// Response was malformed or the server rejected the request
    Protocol,
    /// Success status with nothing usable in the body
    EmptyResponse,
    /// A sync state or watermark store failed
    Store,
    /// The run was cancelled between pages
    Cancelled,
}

/// Errors raised while discovering folders or syncing their items
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("transport error: {detail}")]
    Transport { status: Option<u16>, detail: String },

    #[error("protocol error: {detail}{}", code_suffix(.code))]
    Protocol {
        detail: String,
        code: Option<ResponseCode>,
    },

    #[error("response has empty body")]
    EmptyResponse,

    #[error("store error: {0:#}")]
    Store(#[from] anyhow::Error),

    #[error("sync cancelled")]
    Cancelled,

    #[error("folder {folder}: {source}")]
    Folder {
        folder: FolderId,
        #[source]
        source: Box<SyncError>,
    },
    /// A run that failed after some folders had already finished
    ///
    /// Those folders' tokens are persisted, so their ids are only ever
    /// handed out here.
    #[error("{source}")]
    Incomplete {
        completed: Vec<FolderSyncResult>,
        #[source]
        source: Box<SyncError>,
    },
}

fn code_suffix(code: &Option<ResponseCode>) -> String {
    code.as_ref().map(|c| format!(" ({c})")).unwrap_or_default()
}

impl SyncError {
    /// HTTP error response from the server
    pub fn http_status(status: u16) -> Self {
        Self::Transport {
            status: Some(status),
            detail: format!("HTTP {status} error while sending a request"),
        }
    }

    /// Request never produced a response
    pub fn connection(detail: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            detail: detail.into(),
        }
    }

    /// Structurally invalid response
    pub fn protocol(detail: impl Into<String>) -> Self {
        Self::Protocol {
            detail: detail.into(),
            code: None,
        }
    }

    /// Server rejected the request with a response code
    pub fn rejected(code: ResponseCode) -> Self {
        Self::Protocol {
            detail: "response contained an error".to_string(),
            code: Some(code),
        }
    }

    /// Attach the folder the error happened in
    pub fn in_folder(self, folder: &FolderId) -> Self {
        match self {
            Self::Folder { .. } | Self::Incomplete { .. } => self,
            other => Self::Folder {
                folder: folder.clone(),
                source: Box::new(other),
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Protocol { .. } => ErrorKind::Protocol,
            Self::EmptyResponse => ErrorKind::EmptyResponse,
            Self::Store(_) => ErrorKind::Store,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Folder { source, .. } | Self::Incomplete { source, .. } => source.kind(),
        }
    }

    /// Response code the server rejected the request with, if any
    pub fn response_code(&self) -> Option<&ResponseCode> {
        match self {
            Self::Protocol { code, .. } => code.as_ref(),
            Self::Folder { source, .. } | Self::Incomplete { source, .. } => {
                source.response_code()
            }
            _ => None,
        }
    }

    /// Folder the error is attributed to, if any
    pub fn folder(&self) -> Option<&FolderId> {
        match self {
            Self::Folder { folder, .. } => Some(folder),
            Self::Incomplete { source, .. } => source.folder(),
            _ => None,
        }
    }

    /// Folders that finished before the run failed
    pub fn completed(&self) -> &[FolderSyncResult] {
        match self {
            Self::Incomplete { completed, .. } => completed,
            _ => &[],
        }
    }

    pub fn into_completed(self) -> Vec<FolderSyncResult> {
        match self {
            Self::Incomplete { completed, .. } => completed,
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_message() {
        let err = SyncError::http_status(500);
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.to_string(), "transport error: HTTP 500 error while sending a request");
    }

    #[test]
    fn test_rejected_carries_code() {
        let err = SyncError::rejected(ResponseCode::new("ErrorAccessDenied"));
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(err.response_code().map(ResponseCode::as_str), Some("ErrorAccessDenied"));
        assert_eq!(
            err.to_string(),
            "protocol error: response contained an error (ErrorAccessDenied)"
        );
    }

    #[test]
    fn test_folder_context_preserves_kind() {
        let folder = FolderId::new("f1");
        let err = SyncError::EmptyResponse.in_folder(&folder);
        assert_eq!(err.kind(), ErrorKind::EmptyResponse);
        assert_eq!(err.folder(), Some(&folder));

        // Wrapping twice keeps the innermost folder
        let err = err.in_folder(&FolderId::new("f2"));
        assert_eq!(err.folder(), Some(&folder));
        assert_eq!(err.to_string(), "folder f1: response has empty body");
    }

    #[test]
    fn test_incomplete_run_reports_inner_failure() {
        let finished = FolderSyncResult {
            folder: FolderId::new("a"),
            item_ids: vec![crate::models::ItemId::new("a-0")],
            token: crate::models::SyncToken::new("T1"),
            requests: 1,
        };
        let err = SyncError::Incomplete {
            completed: vec![finished.clone()],
            source: Box::new(SyncError::http_status(503).in_folder(&FolderId::new("b"))),
        };

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.folder(), Some(&FolderId::new("b")));
        assert_eq!(err.completed(), &[finished.clone()]);
        assert_eq!(err.to_string(), "folder b: transport error: HTTP 503 error while sending a request");
        assert_eq!(err.into_completed(), vec![finished]);
        assert!(SyncError::Cancelled.completed().is_empty());
    }

    #[test]
    fn test_store_error_from_anyhow() {
        let err: SyncError = anyhow::anyhow!("disk full").into();
        assert_eq!(err.kind(), ErrorKind::Store);
        assert_eq!(err.to_string(), "store error: disk full");
    }
}
