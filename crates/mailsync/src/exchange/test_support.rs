//! Scripted transport for unit tests

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use super::Transport;
use super::api::{
    FindFolderResponse, FindFolderResponseMessage, FolderEntry, ItemChange, RequestBody,
    ResponseBody, ResponseCode, RootFolder, SyncChanges, SyncFolderItemsRequest,
    SyncFolderItemsResponse, SyncFolderItemsResponseMessage,
};
use crate::error::{Result, SyncError};
use crate::models::{FolderId, ItemId};

/// Replays canned responses in order and records every request
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ResponseBody>>>,
    requests: Mutex<Vec<(RequestBody, String)>>,
}

impl ScriptedTransport {
    pub(crate) fn new(responses: Vec<Result<ResponseBody>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<(RequestBody, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &RequestBody, user: &str) -> Result<ResponseBody> {
        self.requests
            .lock()
            .unwrap()
            .push((request.clone(), user.to_string()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SyncError::connection("script exhausted")))
    }
}

/// In-memory server holding a flat set of folders with numbered items
///
/// Tokens have the form `T<offset>`. Only this fake reads them.
pub(crate) struct FakeMailbox {
    folders: Mutex<BTreeMap<FolderId, Vec<ItemId>>>,
    rejections: HashMap<FolderId, ResponseCode>,
    requests: Mutex<Vec<(RequestBody, String)>>,
}

impl FakeMailbox {
    pub(crate) fn new() -> Self {
        Self {
            folders: Mutex::new(BTreeMap::new()),
            rejections: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_folder(self, id: &str, items: usize) -> Self {
        self.deliver(id, items);
        self
    }

    /// Answer every sync of `id` with `code`
    pub(crate) fn rejecting(mut self, id: &str, code: &str) -> Self {
        self.rejections.insert(FolderId::new(id), ResponseCode::new(code));
        self
    }

    /// Add `count` new items to folder `id`, creating it if needed
    pub(crate) fn deliver(&self, id: &str, count: usize) {
        let mut folders = self.folders.lock().unwrap();
        let items = folders.entry(FolderId::new(id)).or_default();
        let start = items.len();
        items.extend((start..start + count).map(|n| ItemId::new(format!("{id}-{n}"))));
    }

    /// Number of sync requests that targeted folder `id`
    pub(crate) fn sync_requests_for(&self, id: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(body, _)| {
                matches!(body, RequestBody::SyncFolderItems(r) if r.sync_folder_id.as_str() == id)
            })
            .count()
    }

    fn find_folders(&self) -> ResponseBody {
        let folders = self.folders.lock().unwrap();
        let entries = folders
            .keys()
            .map(|id| FolderEntry {
                folder_id: Some(id.clone()),
                display_name: None,
            })
            .collect();
        ResponseBody::FindFolderResponse(FindFolderResponse {
            response_messages: vec![FindFolderResponseMessage {
                response_code: Some(ResponseCode::no_error()),
                message_text: None,
                root_folder: Some(RootFolder {
                    folders: Some(entries),
                    total_items_in_view: None,
                }),
            }],
        })
    }

    fn sync_items(&self, request: &SyncFolderItemsRequest) -> Result<ResponseBody> {
        let folder = &request.sync_folder_id;
        if let Some(code) = self.rejections.get(folder) {
            return Ok(ResponseBody::SyncFolderItemsResponse(SyncFolderItemsResponse {
                response_messages: vec![SyncFolderItemsResponseMessage {
                    response_code: Some(code.clone()),
                    ..Default::default()
                }],
            }));
        }

        let folders = self.folders.lock().unwrap();
        let items = folders
            .get(folder)
            .ok_or_else(|| SyncError::rejected(ResponseCode::new("ErrorFolderNotFound")))?;
        let offset = request
            .sync_state
            .as_deref()
            .and_then(|s| s.strip_prefix('T'))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0)
            .min(items.len());
        let end = (offset + request.max_changes_returned as usize).min(items.len());

        Ok(ResponseBody::SyncFolderItemsResponse(SyncFolderItemsResponse {
            response_messages: vec![SyncFolderItemsResponseMessage {
                response_code: Some(ResponseCode::no_error()),
                message_text: None,
                sync_state: Some(format!("T{end}")),
                includes_last_item_in_range: Some(end == items.len()),
                changes: Some(SyncChanges {
                    create: items[offset..end]
                        .iter()
                        .map(|id| ItemChange {
                            item_id: Some(id.clone()),
                        })
                        .collect(),
                    ..Default::default()
                }),
            }],
        }))
    }
}

impl Transport for FakeMailbox {
    fn send(&self, request: &RequestBody, user: &str) -> Result<ResponseBody> {
        self.requests
            .lock()
            .unwrap()
            .push((request.clone(), user.to_string()));
        match request {
            RequestBody::FindFolder(_) => Ok(self.find_folders()),
            RequestBody::SyncFolderItems(request) => self.sync_items(request),
        }
    }
}
