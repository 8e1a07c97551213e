//! Storage area abstraction
//!
//! Mirrors the browser `Storage` interface. Mutating operations return what
//! they replaced so callers can build change events without a second read.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaKind {
    /// Persists across restarts until explicitly cleared
    Local,
    /// Lives as long as the owning tab
    Session,
}

impl AreaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaKind::Local => "local",
            AreaKind::Session => "session",
        }
    }
}

impl std::fmt::Display for AreaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AreaKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "localstorage" => Ok(AreaKind::Local),
            "session" | "sessionstorage" => Ok(AreaKind::Session),
            _ => Err(format!("Unknown storage area: {}", s)),
        }
    }
}

/// A string-keyed, string-valued storage area.
pub trait StorageArea: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, returning the previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<Option<String>>;

    /// Remove `key`, returning the removed value. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<Option<String>>;

    /// Remove every key, returning how many were removed.
    fn clear(&self) -> Result<usize>;

    fn keys(&self) -> Result<Vec<String>>;

    fn len(&self) -> Result<usize> {
        Ok(self.keys()?.len())
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl<T: StorageArea + ?Sized> StorageArea for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<Option<String>> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<Option<String>> {
        (**self).remove_item(key)
    }

    fn clear(&self) -> Result<usize> {
        (**self).clear()
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }

    fn len(&self) -> Result<usize> {
        (**self).len()
    }
}
