//! In-memory storage area
//!
//! Backs every session area and stands in for the durable area in tests.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::area::StorageArea;
use crate::error::StorageError;
use crate::Result;

#[derive(Default)]
struct Entries {
    items: BTreeMap<String, String>,
    /// Sum of key and value lengths, in bytes
    used: usize,
}

pub struct MemoryArea {
    entries: Arc<RwLock<Entries>>,
    /// Byte budget for keys plus values; `None` is unbounded
    quota: Option<usize>,
}

impl MemoryArea {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Entries::default())),
            quota: None,
        }
    }

    /// An area that rejects writes once keys plus values exceed `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::new()
        }
    }

    pub fn used_bytes(&self) -> usize {
        self.entries.read().used
    }
}

impl Default for MemoryArea {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryArea {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            quota: self.quota,
        }
    }
}

impl StorageArea for MemoryArea {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<Option<String>> {
        let mut entries = self.entries.write();

        let freed = entries
            .items
            .get(key)
            .map(|old| key.len() + old.len())
            .unwrap_or(0);
        let used = entries.used - freed + key.len() + value.len();

        if let Some(quota) = self.quota {
            if used > quota {
                tracing::warn!(key = %key, used, quota, "Storage quota exceeded");
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }

        entries.used = used;
        Ok(entries.items.insert(key.to_string(), value.to_string()))
    }

    fn remove_item(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.write();
        let removed = entries.items.remove(key);
        if let Some(old) = &removed {
            entries.used -= key.len() + old.len();
        }
        Ok(removed)
    }

    fn clear(&self) -> Result<usize> {
        let mut entries = self.entries.write();
        let count = entries.items.len();
        entries.items.clear();
        entries.used = 0;
        Ok(count)
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().items.keys().cloned().collect())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.entries.read().items.len())
    }
}
