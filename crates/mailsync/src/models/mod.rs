//! Domain models for the mirror engine

mod folder;
mod item;
mod sync_state;
mod watermark;

pub use folder::{DistinguishedFolder, FolderId, FolderRoot};
pub use item::ItemId;
pub use sync_state::{FolderSyncResult, PageResult, SyncToken};
pub use watermark::{advance_watermark, epoch};
