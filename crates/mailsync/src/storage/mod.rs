//! Progress storage traits and implementations
//!
//! This module defines the two narrow stores the sync engine needs:
//! per-folder continuation tokens and per-user watermarks. The trait-based
//! design allows swapping between in-memory and persistent implementations.

mod memory;
mod sqlite;
mod traits;

pub use memory::{InMemorySyncStateStore, InMemoryWatermarkStore, NoopWatermarkStore};
pub use sqlite::SqliteProgressStore;
pub use traits::{SyncStateStore, WatermarkStore};
