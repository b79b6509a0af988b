//! Remote mailbox protocol
//!
//! This module provides:
//! - Typed request/response bodies for the two calls the mirror makes
//! - The [`Transport`] capability and an HTTP implementation of it
//! - Folder discovery and paged item sync built on top of a transport

mod find_folder;
mod http;
mod sync_items;
mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use find_folder::{discover_all, discover_folders, find_folders_request};
pub use http::{HttpTransport, decode_response};
pub use sync_items::{ItemSyncPaginator, MAX_SYNC_COUNT, sync_folder_items_request};
pub use transport::{CancelToken, Transport};

/// Request and response types exchanged with the server
pub mod api {
    use serde::{Deserialize, Serialize};
    use std::fmt;

    use crate::models::{FolderId, FolderRoot, ItemId};

    /// Per-message status reported by the server
    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ResponseCode(String);

    impl ResponseCode {
        pub const NO_ERROR: &'static str = "NoError";

        pub fn new(code: impl Into<String>) -> Self {
            Self(code.into())
        }

        pub fn no_error() -> Self {
            Self::new(Self::NO_ERROR)
        }

        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn is_success(&self) -> bool {
            self.0 == Self::NO_ERROR
        }
    }

    impl fmt::Display for ResponseCode {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    /// How much of each folder or item the server should return
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum BaseShape {
        IdOnly,
        Default,
        AllProperties,
    }

    /// How far below the parent folder a search reaches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum FolderTraversal {
        /// Immediate children only
        Shallow,
        /// Every descendant
        Deep,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FindFolderRequest {
        pub traversal: FolderTraversal,
        pub folder_shape: BaseShape,
        pub parent_folder_ids: Vec<FolderRoot>,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FindFolderResponse {
        #[serde(default)]
        pub response_messages: Vec<FindFolderResponseMessage>,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FindFolderResponseMessage {
        pub response_code: Option<ResponseCode>,
        pub message_text: Option<String>,
        pub root_folder: Option<RootFolder>,
    }

    /// Folders found beneath one parent
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RootFolder {
        pub folders: Option<Vec<FolderEntry>>,
        pub total_items_in_view: Option<u32>,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FolderEntry {
        pub folder_id: Option<FolderId>,
        pub display_name: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SyncFolderItemsRequest {
        pub item_shape: BaseShape,
        pub sync_folder_id: FolderId,
        /// Omitted on the first sync of a folder
        #[serde(skip_serializing_if = "Option::is_none")]
        pub sync_state: Option<String>,
        pub max_changes_returned: u32,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SyncFolderItemsResponse {
        #[serde(default)]
        pub response_messages: Vec<SyncFolderItemsResponseMessage>,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SyncFolderItemsResponseMessage {
        pub response_code: Option<ResponseCode>,
        pub message_text: Option<String>,
        pub sync_state: Option<String>,
        pub includes_last_item_in_range: Option<bool>,
        pub changes: Option<SyncChanges>,
    }

    /// Changes reported since the sync state that was sent
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct SyncChanges {
        #[serde(default)]
        pub create: Vec<ItemChange>,
        #[serde(default)]
        pub update: Vec<ItemChange>,
        #[serde(default)]
        pub delete: Vec<ItemChange>,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ItemChange {
        pub item_id: Option<ItemId>,
    }

    impl ItemChange {
        pub fn new(id: impl Into<String>) -> Self {
            Self {
                item_id: Some(ItemId::new(id)),
            }
        }
    }

    /// Body of a request envelope
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub enum RequestBody {
        FindFolder(FindFolderRequest),
        SyncFolderItems(SyncFolderItemsRequest),
    }

    /// Body of a response envelope
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub enum ResponseBody {
        FindFolderResponse(FindFolderResponse),
        SyncFolderItemsResponse(SyncFolderItemsResponse),
    }

    /// Principal the server should act as
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Impersonation {
        pub principal_name: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct RequestHeader {
        pub impersonation: Impersonation,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct RequestEnvelope {
        pub header: RequestHeader,
        pub body: RequestBody,
    }

    impl RequestEnvelope {
        /// Wrap a request body so it runs as `user`
        pub fn impersonating(user: &str, body: RequestBody) -> Self {
            Self {
                header: RequestHeader {
                    impersonation: Impersonation {
                        principal_name: user.to_string(),
                    },
                },
                body,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ResponseEnvelope {
        pub body: Option<ResponseBody>,
    }
}
