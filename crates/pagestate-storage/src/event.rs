//! Storage change events
//!
//! Shape follows the platform `StorageEvent`: `key` is `None` when the whole
//! area was cleared, `old_value` is `None` for additions and `new_value` is
//! `None` for removals.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::area::AreaKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEvent {
    /// Area the change happened in
    pub area: AreaKind,
    pub key: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    /// Document URL of the context that made the change
    pub url: String,
}

impl StorageEvent {
    pub fn is_clear(&self) -> bool {
        self.key.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

pub type Listener = Arc<dyn Fn(&StorageEvent) + Send + Sync>;

/// Something that delivers storage events to registered listeners.
pub trait StorageEvents: Send + Sync {
    fn add_listener(&self, listener: Listener) -> ListenerId;

    /// Returns `false` if `id` was not registered. Once this returns, `id`
    /// is never invoked again, from any thread. A call made while `id` is
    /// running on another thread waits for that invocation to finish.
    fn remove_listener(&self, id: ListenerId) -> bool;
}
