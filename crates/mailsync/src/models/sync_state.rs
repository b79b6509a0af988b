//! Continuation tokens and per-page sync results

use serde::{Deserialize, Serialize};

use super::{FolderId, ItemId};

/// Opaque continuation cursor for one (user, folder) pair
///
/// The server owns the contents. A token is only ever replaced wholesale by
/// the one the server hands back and is compared by equality, never parsed.
/// The empty token asks the server to start from the beginning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncToken(String);

impl SyncToken {
    /// Token for a folder that has never been synced
    pub fn initial() -> Self {
        Self(String::new())
    }

    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn is_initial(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wire form: the initial token is omitted from requests
    pub fn to_request(&self) -> Option<String> {
        if self.is_initial() {
            None
        } else {
            Some(self.0.clone())
        }
    }
}

impl From<String> for SyncToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SyncToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Outcome of one sync request against a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    /// Items created since the token that was sent, in server order
    pub item_ids: Vec<ItemId>,
    /// Token to send with the next request
    pub token: SyncToken,
    /// Server reported that no further pages remain
    pub includes_last_item: bool,
}

impl PageResult {
    /// Empty page carrying the token that was sent
    pub(crate) fn starting_from(token: &SyncToken) -> Self {
        Self {
            item_ids: Vec::new(),
            token: token.clone(),
            includes_last_item: false,
        }
    }

    pub fn more_pages(&self) -> bool {
        !self.includes_last_item
    }
}

/// Outcome of paging a folder to exhaustion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSyncResult {
    pub folder: FolderId,
    /// New items across every page, in the order the server returned them
    pub item_ids: Vec<ItemId>,
    /// Terminal token, persisted as the folder's sync state
    pub token: SyncToken,
    /// Number of requests issued
    pub requests: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_token_is_omitted_from_requests() {
        assert!(SyncToken::initial().is_initial());
        assert_eq!(SyncToken::initial().to_request(), None);
        assert_eq!(SyncToken::default(), SyncToken::initial());
    }

    #[test]
    fn test_token_round_trips_verbatim() {
        let token = SyncToken::new("H4sIAAAAAAAEAO29B2AcSZ==");
        assert!(!token.is_initial());
        assert_eq!(token.to_request().as_deref(), Some("H4sIAAAAAAAEAO29B2AcSZ=="));
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"H4sIAAAAAAAEAO29B2AcSZ==\"");
    }

    #[test]
    fn test_page_starting_from_keeps_token() {
        let page = PageResult::starting_from(&SyncToken::new("T0"));
        assert_eq!(page.token.as_str(), "T0");
        assert!(page.item_ids.is_empty());
        assert!(page.more_pages());
    }
}
