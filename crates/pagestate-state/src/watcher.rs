//! Cross-context change notifications for the durable area

use std::sync::Arc;

use pagestate_storage::{AreaKind, Listener, ListenerId, StorageEvent, StorageEvents};

/// A durable-area change made by another context. Values are the raw stored
/// strings; `key` is `None` when the whole area was cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    pub key: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl From<&StorageEvent> for StorageChange {
    fn from(event: &StorageEvent) -> Self {
        Self {
            key: event.key.clone(),
            old_value: event.old_value.clone(),
            new_value: event.new_value.clone(),
        }
    }
}

pub struct ChangeWatcher {
    events: Arc<dyn StorageEvents>,
}

impl ChangeWatcher {
    pub fn new(events: impl StorageEvents + 'static) -> Self {
        Self {
            events: Arc::new(events),
        }
    }

    /// Call `callback` once per durable-area change delivered to this
    /// context. Session-area events are ignored.
    pub fn watch<F>(&self, callback: F) -> Subscription
    where
        F: Fn(StorageChange) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(move |event: &StorageEvent| {
            if event.area == AreaKind::Local {
                callback(StorageChange::from(event));
            }
        });

        let id = self.events.add_listener(listener);
        tracing::debug!(listener = ?id, "Watching durable storage");

        Subscription {
            events: Arc::clone(&self.events),
            id: Some(id),
        }
    }
}

/// Deregisters its callback on [`Subscription::unsubscribe`] or on drop.
#[must_use = "dropping a Subscription stops the callback"]
pub struct Subscription {
    events: Arc<dyn StorageEvents>,
    id: Option<ListenerId>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    fn cancel(&mut self) {
        if let Some(id) = self.id.take() {
            self.events.remove_listener(id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Watch the browser's own `storage` events, keeping durable-area changes.
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub fn watch_browser<F>(callback: F) -> crate::Result<pagestate_storage::web::WebListener>
where
    F: Fn(StorageChange) + 'static,
{
    let listener = pagestate_storage::web::listen(move |event| {
        if event.area == AreaKind::Local {
            callback(StorageChange::from(&event));
        }
    })?;
    Ok(listener)
}
