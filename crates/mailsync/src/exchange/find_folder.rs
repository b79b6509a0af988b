//! Folder discovery

use log::{debug, warn};
use std::collections::BTreeSet;

use super::Transport;
use super::api::{BaseShape, FindFolderRequest, FolderTraversal};
use crate::error::{Result, SyncError};
use crate::models::{FolderId, FolderRoot};

/// Build a request for every folder beneath `root`
///
/// Deep traversal reaches all descendants, not only direct children, and
/// the id-only shape keeps the server from sending folder metadata.
pub fn find_folders_request(root: &FolderRoot) -> FindFolderRequest {
    FindFolderRequest {
        traversal: FolderTraversal::Deep,
        folder_shape: BaseShape::IdOnly,
        parent_folder_ids: vec![root.clone()],
    }
}

/// Find every folder beneath `root` in `user`'s mailbox
///
/// The root itself is not included. A message carrying any status other
/// than `NoError` fails the whole call; nothing is retried here. A response
/// without a root folder section is a protocol error.
pub fn discover_folders(
    transport: &dyn Transport,
    root: &FolderRoot,
    user: &str,
) -> Result<BTreeSet<FolderId>> {
    let response = transport.find_folder(find_folders_request(root), user)?;
    if response.response_messages.is_empty() {
        warn!("Find folder under {} for {} returned no messages", root, user);
        return Err(SyncError::protocol("response did not contain a root folder"));
    }

    let mut folders = BTreeSet::new();
    for message in response.response_messages {
        if let Some(code) = message.response_code
            && !code.is_success()
        {
            warn!(
                "Find folder under {} for {} rejected: {} {}",
                root,
                user,
                code,
                message.message_text.as_deref().unwrap_or_default()
            );
            return Err(SyncError::rejected(code));
        }

        let Some(root_folder) = message.root_folder else {
            warn!("Find folder under {} for {} is missing its root folder", root, user);
            return Err(SyncError::protocol("response did not contain a root folder"));
        };
        // A root folder without a folder list has no descendants
        let Some(entries) = root_folder.folders else {
            continue;
        };
        folders.extend(entries.into_iter().filter_map(|entry| entry.folder_id));
    }

    debug!("Discovered {} folders under {} for {}", folders.len(), root, user);
    Ok(folders)
}

/// Union of the folders beneath each of `roots`
///
/// Stops at the first root that fails.
pub fn discover_all(
    transport: &dyn Transport,
    roots: &[FolderRoot],
    user: &str,
) -> Result<BTreeSet<FolderId>> {
    let mut folders = BTreeSet::new();
    for root in roots {
        folders.extend(discover_folders(transport, root, user)?);
    }
    Ok(folders)
}
