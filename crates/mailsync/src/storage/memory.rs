//! In-memory storage implementations
//!
//! Used by tests and by one-off runs that do not need progress to survive
//! the process. Every instance starts empty; nothing is shared between
//! instances.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

use super::{SyncStateStore, WatermarkStore};
use crate::models::{FolderId, SyncToken, epoch};

/// In-memory implementation of SyncStateStore
#[derive(Default)]
pub struct InMemorySyncStateStore {
    tokens: RwLock<HashMap<(String, FolderId), SyncToken>>,
}

impl InMemorySyncStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of (user, folder) pairs with a stored token
    pub fn len(&self) -> Result<usize> {
        let tokens = self
            .tokens
            .read()
            .map_err(|_| anyhow!("sync state lock poisoned"))?;
        Ok(tokens.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl SyncStateStore for InMemorySyncStateStore {
    fn get_token(&self, user: &str, folder: &FolderId) -> Result<SyncToken> {
        let tokens = self
            .tokens
            .read()
            .map_err(|_| anyhow!("sync state lock poisoned"))?;
        Ok(tokens
            .get(&(user.to_string(), folder.clone()))
            .cloned()
            .unwrap_or_default())
    }

    fn put_token(&self, user: &str, folder: &FolderId, token: &SyncToken) -> Result<()> {
        let mut tokens = self
            .tokens
            .write()
            .map_err(|_| anyhow!("sync state lock poisoned"))?;
        tokens.insert((user.to_string(), folder.clone()), token.clone());
        Ok(())
    }
}

/// In-memory implementation of WatermarkStore
#[derive(Default)]
pub struct InMemoryWatermarkStore {
    watermarks: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl InMemoryWatermarkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WatermarkStore for InMemoryWatermarkStore {
    fn get_watermark(&self, user: &str) -> Result<DateTime<Utc>> {
        let watermarks = self
            .watermarks
            .read()
            .map_err(|_| anyhow!("watermark lock poisoned"))?;
        Ok(watermarks.get(user).copied().unwrap_or_else(epoch))
    }

    fn put_watermark(&self, user: &str, at: DateTime<Utc>) -> Result<()> {
        let mut watermarks = self
            .watermarks
            .write()
            .map_err(|_| anyhow!("watermark lock poisoned"))?;
        watermarks.insert(user.to_string(), at);
        Ok(())
    }
}

/// Watermark store that remembers nothing
///
/// Every user always reads as never synced, so each run starts from the
/// epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWatermarkStore;

impl WatermarkStore for NoopWatermarkStore {
    fn get_watermark(&self, _user: &str) -> Result<DateTime<Utc>> {
        Ok(epoch())
    }

    fn put_watermark(&self, _user: &str, _at: DateTime<Utc>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_unknown_folder_has_initial_token() {
        let store = InMemorySyncStateStore::new();
        let token = store.get_token("bkerr", &FolderId::new("f1")).unwrap();
        assert!(token.is_initial());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_tokens_are_keyed_by_user_and_folder() {
        let store = InMemorySyncStateStore::new();
        let folder = FolderId::new("f1");
        store.put_token("alice", &folder, &SyncToken::new("A1")).unwrap();
        store.put_token("bob", &folder, &SyncToken::new("B1")).unwrap();

        assert_eq!(store.get_token("alice", &folder).unwrap(), SyncToken::new("A1"));
        assert_eq!(store.get_token("bob", &folder).unwrap(), SyncToken::new("B1"));
        assert!(store.get_token("alice", &FolderId::new("f2")).unwrap().is_initial());
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_token_replaced_wholesale() {
        let store = InMemorySyncStateStore::new();
        let folder = FolderId::new("f1");
        store.put_token("alice", &folder, &SyncToken::new("A1")).unwrap();
        store.put_token("alice", &folder, &SyncToken::new("A2")).unwrap();
        assert_eq!(store.get_token("alice", &folder).unwrap(), SyncToken::new("A2"));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_poisoned_lock_is_an_error() {
        let store = InMemorySyncStateStore::new();
        store.put_token("u", &FolderId::new("f1"), &SyncToken::new("A1")).unwrap();

        let _ = std::panic::catch_unwind(|| {
            let _guard = store.tokens.write().unwrap();
            panic!("writer died holding the lock");
        });

        assert!(store.len().is_err());
        assert!(store.is_empty().is_err());
        assert!(store.get_token("u", &FolderId::new("f1")).is_err());
    }

    #[test]
    fn test_unknown_user_watermark_is_epoch() {
        let store = InMemoryWatermarkStore::new();
        assert_eq!(store.get_watermark("not actually a username").unwrap(), epoch());
    }

    #[test]
    fn test_update_existing_user_watermark() {
        let store = InMemoryWatermarkStore::new();
        let first = Utc.timestamp_millis_opt(3_425_322).unwrap();
        let second = Utc.timestamp_millis_opt(2 * 3_425_322).unwrap();

        store.put_watermark("Some other username", first).unwrap();
        assert_eq!(store.get_watermark("Some other username").unwrap(), first);
        store.put_watermark("Some other username", second).unwrap();
        assert_eq!(store.get_watermark("Some other username").unwrap(), second);
    }

    #[test]
    fn test_fresh_instances_share_nothing() {
        let first = InMemoryWatermarkStore::new();
        first.put_watermark("u", Utc::now()).unwrap();
        let second = InMemoryWatermarkStore::new();
        assert_eq!(second.get_watermark("u").unwrap(), epoch());
    }

    #[test]
    fn test_noop_store_forgets() {
        let store = NoopWatermarkStore;
        store.put_watermark("u", Utc::now()).unwrap();
        assert_eq!(store.get_watermark("u").unwrap(), epoch());
    }
}
