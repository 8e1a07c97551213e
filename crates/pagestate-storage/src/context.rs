//! Origins and browsing contexts
//!
//! An [`Origin`] owns the durable area shared by all of its contexts. Each
//! [`BrowsingContext`] is a tab or a frame: tabs get a fresh session area,
//! frames share the session area of the context that opened them.
//!
//! Writes made through a context's [`AreaHandle`] are queued as
//! [`StorageEvent`]s on every *other* context that can see the area. Queued
//! events reach listeners when the receiving context calls
//! [`BrowsingContext::pump`], which stands in for one event-loop turn.

use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use url::Url;
use uuid::Uuid;

use crate::area::{AreaKind, StorageArea};
use crate::event::{Listener, ListenerId, StorageEvent, StorageEvents};
use crate::memory::MemoryArea;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(Uuid);

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct SessionScope {
    id: Uuid,
    area: Arc<MemoryArea>,
}

struct ListenerEntry {
    id: ListenerId,
    active: AtomicBool,
    callback: Listener,
}

struct ContextShared {
    id: ContextId,
    url: Url,
    session: Arc<SessionScope>,
    queue: Mutex<VecDeque<StorageEvent>>,
    listeners: RwLock<Vec<Arc<ListenerEntry>>>,
    next_listener_id: AtomicU64,
    /// Held while a callback runs. Reentrant so a callback may remove
    /// listeners on its own context.
    dispatch: ReentrantMutex<()>,
}

struct OriginInner {
    url: Url,
    local: Arc<dyn StorageArea>,
    contexts: RwLock<Vec<Weak<ContextShared>>>,
    /// Held across a mutation and its broadcast, so every context queues
    /// events in the order the areas changed
    write_lock: Mutex<()>,
}

pub struct Origin {
    inner: Arc<OriginInner>,
}

impl Origin {
    pub fn new(url: &str, local: impl StorageArea + 'static) -> Result<Self> {
        let url = Url::parse(url)?;

        Ok(Self {
            inner: Arc::new(OriginInner {
                url,
                local: Arc::new(local),
                contexts: RwLock::new(Vec::new()),
                write_lock: Mutex::new(()),
            }),
        })
    }

    /// An origin whose durable area lives only as long as the process.
    pub fn in_memory(url: &str) -> Result<Self> {
        Self::new(url, MemoryArea::new())
    }

    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    /// Open a top-level context with its own session area.
    pub fn open_tab(&self, path: &str) -> Result<BrowsingContext> {
        let url = self.inner.url.join(path)?;
        let session = Arc::new(SessionScope {
            id: Uuid::new_v4(),
            area: Arc::new(MemoryArea::new()),
        });
        Ok(self.attach(url, session))
    }

    /// Number of contexts still alive.
    pub fn context_count(&self) -> usize {
        self.inner
            .contexts
            .read()
            .iter()
            .filter(|c| c.strong_count() > 0)
            .count()
    }

    fn attach(&self, url: Url, session: Arc<SessionScope>) -> BrowsingContext {
        let shared = Arc::new(ContextShared {
            id: ContextId(Uuid::new_v4()),
            url,
            session,
            queue: Mutex::new(VecDeque::new()),
            listeners: RwLock::new(Vec::new()),
            next_listener_id: AtomicU64::new(0),
            dispatch: ReentrantMutex::new(()),
        });

        {
            let mut contexts = self.inner.contexts.write();
            contexts.retain(|c| c.strong_count() > 0);
            contexts.push(Arc::downgrade(&shared));
        }

        tracing::debug!(context_id = %shared.id, url = %shared.url, "Opened browsing context");

        BrowsingContext {
            origin: self.clone(),
            shared,
        }
    }

    /// Queue `event` on every live context other than `source`. Session
    /// events only reach contexts in the same session scope.
    fn broadcast(&self, source: ContextId, scope: Option<Uuid>, event: StorageEvent) {
        let contexts = self.inner.contexts.read();
        let mut delivered = 0usize;

        for context in contexts.iter().filter_map(Weak::upgrade) {
            if context.id == source {
                continue;
            }
            if let Some(scope) = scope {
                if context.session.id != scope {
                    continue;
                }
            }
            context.queue.lock().push_back(event.clone());
            delivered += 1;
        }

        tracing::trace!(
            area = %event.area,
            key = ?event.key,
            delivered,
            "Broadcast storage event"
        );
    }
}

impl Clone for Origin {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// A tab or frame. Clones refer to the same context.
pub struct BrowsingContext {
    origin: Origin,
    shared: Arc<ContextShared>,
}

impl BrowsingContext {
    pub fn id(&self) -> ContextId {
        self.shared.id
    }

    pub fn url(&self) -> &Url {
        &self.shared.url
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Open a same-origin frame that shares this context's session area.
    pub fn open_frame(&self, path: &str) -> Result<BrowsingContext> {
        let url = self.shared.url.join(path)?;
        Ok(self.origin.attach(url, Arc::clone(&self.shared.session)))
    }

    pub fn local_storage(&self) -> AreaHandle {
        AreaHandle {
            kind: AreaKind::Local,
            area: Arc::clone(&self.origin.inner.local),
            context: self.clone(),
        }
    }

    pub fn session_storage(&self) -> AreaHandle {
        AreaHandle {
            kind: AreaKind::Session,
            area: self.shared.session.area.clone(),
            context: self.clone(),
        }
    }

    pub fn pending_events(&self) -> usize {
        self.shared.queue.lock().len()
    }

    /// Deliver every queued event to the listeners registered at delivery
    /// time. Returns the number of events drained.
    pub fn pump(&self) -> usize {
        let events: Vec<StorageEvent> = self.shared.queue.lock().drain(..).collect();

        for event in &events {
            let listeners = self.shared.listeners.read().clone();
            for entry in listeners {
                let _dispatch = self.shared.dispatch.lock();
                // Skip listeners removed earlier in this dispatch
                if entry.active.load(Ordering::Acquire) {
                    (entry.callback)(event);
                }
            }
        }

        events.len()
    }
}

impl Clone for BrowsingContext {
    fn clone(&self) -> Self {
        Self {
            origin: self.origin.clone(),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl StorageEvents for BrowsingContext {
    fn add_listener(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.shared.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.shared.listeners.write().push(Arc::new(ListenerEntry {
            id,
            active: AtomicBool::new(true),
            callback: listener,
        }));
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        // Waits out a callback running on another thread
        let _dispatch = self.shared.dispatch.lock();
        let mut listeners = self.shared.listeners.write();
        match listeners.iter().position(|entry| entry.id == id) {
            Some(index) => {
                let entry = listeners.remove(index);
                entry.active.store(false, Ordering::Release);
                true
            }
            None => false,
        }
    }
}

/// A storage area as seen from one context. Mutations notify the other
/// contexts that share the area; reads and no-op writes do not.
pub struct AreaHandle {
    kind: AreaKind,
    area: Arc<dyn StorageArea>,
    context: BrowsingContext,
}

impl AreaHandle {
    pub fn kind(&self) -> AreaKind {
        self.kind
    }

    fn notify(&self, key: Option<&str>, old_value: Option<String>, new_value: Option<String>) {
        let scope = match self.kind {
            AreaKind::Local => None,
            AreaKind::Session => Some(self.context.shared.session.id),
        };

        let event = StorageEvent {
            area: self.kind,
            key: key.map(str::to_string),
            old_value,
            new_value,
            url: self.context.shared.url.to_string(),
        };

        self.context
            .origin
            .broadcast(self.context.shared.id, scope, event);
    }
}

impl Clone for AreaHandle {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            area: Arc::clone(&self.area),
            context: self.context.clone(),
        }
    }
}

impl StorageArea for AreaHandle {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.area.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<Option<String>> {
        let _write = self.context.origin.inner.write_lock.lock();
        let previous = self.area.set_item(key, value)?;
        if previous.as_deref() != Some(value) {
            self.notify(Some(key), previous.clone(), Some(value.to_string()));
        }
        Ok(previous)
    }

    fn remove_item(&self, key: &str) -> Result<Option<String>> {
        let _write = self.context.origin.inner.write_lock.lock();
        let previous = self.area.remove_item(key)?;
        if previous.is_some() {
            self.notify(Some(key), previous.clone(), None);
        }
        Ok(previous)
    }

    fn clear(&self) -> Result<usize> {
        let _write = self.context.origin.inner.write_lock.lock();
        let removed = self.area.clear()?;
        if removed > 0 {
            self.notify(None, None, None);
        }
        Ok(removed)
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.area.keys()
    }

    fn len(&self) -> Result<usize> {
        self.area.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(context: &BrowsingContext) -> (Arc<Mutex<Vec<StorageEvent>>>, ListenerId) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = context.add_listener(Arc::new(move |event: &StorageEvent| {
            sink.lock().push(event.clone());
        }));
        (seen, id)
    }

    #[test]
    fn test_local_write_reaches_other_tabs_only() {
        let origin = Origin::in_memory("https://app.example").unwrap();
        let writer = origin.open_tab("/login.html").unwrap();
        let reader = origin.open_tab("/user-center.html").unwrap();

        let (writer_seen, _) = recorder(&writer);
        let (reader_seen, _) = recorder(&reader);

        writer.local_storage().set_item("token", "abc123").unwrap();

        assert_eq!(writer.pending_events(), 0);
        assert_eq!(reader.pump(), 1);
        assert!(writer_seen.lock().is_empty());

        let seen = reader_seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].area, AreaKind::Local);
        assert_eq!(seen[0].key.as_deref(), Some("token"));
        assert_eq!(seen[0].old_value, None);
        assert_eq!(seen[0].new_value.as_deref(), Some("abc123"));
        assert_eq!(seen[0].url, "https://app.example/login.html");
    }

    #[test]
    fn test_session_areas_are_per_tab() {
        let origin = Origin::in_memory("https://app.example").unwrap();
        let first = origin.open_tab("/").unwrap();
        let second = origin.open_tab("/").unwrap();

        first.session_storage().set_item("draft", "\"hi\"").unwrap();

        assert_eq!(second.session_storage().get_item("draft").unwrap(), None);
        assert_eq!(second.pending_events(), 0);
    }

    #[test]
    fn test_frames_share_session_area_and_events() {
        let origin = Origin::in_memory("https://app.example").unwrap();
        let tab = origin.open_tab("/user-center.html").unwrap();
        let frame = tab.open_frame("/frame.html").unwrap();
        let other_tab = origin.open_tab("/").unwrap();

        let (tab_seen, _) = recorder(&tab);

        frame.session_storage().set_item("step", "2").unwrap();

        assert_eq!(
            tab.session_storage().get_item("step").unwrap(),
            Some("2".to_string())
        );
        assert_eq!(other_tab.pending_events(), 0);
        tab.pump();
        assert_eq!(tab_seen.lock()[0].area, AreaKind::Session);
    }

    #[test]
    fn test_no_event_for_noop_mutations() {
        let origin = Origin::in_memory("https://app.example").unwrap();
        let writer = origin.open_tab("/").unwrap();
        let reader = origin.open_tab("/").unwrap();
        let local = writer.local_storage();

        local.set_item("token", "abc").unwrap();
        local.set_item("token", "abc").unwrap();
        local.remove_item("missing").unwrap();
        local.clear().unwrap();
        local.clear().unwrap();

        // set + clear
        assert_eq!(reader.pending_events(), 2);
    }

    #[test]
    fn test_clear_event_has_no_key() {
        let origin = Origin::in_memory("https://app.example").unwrap();
        let writer = origin.open_tab("/").unwrap();
        let reader = origin.open_tab("/").unwrap();
        let (seen, _) = recorder(&reader);

        writer.local_storage().set_item("user", "{}").unwrap();
        writer.local_storage().clear().unwrap();
        reader.pump();

        let seen = seen.lock();
        assert!(seen[1].is_clear());
        assert_eq!(seen[1].old_value, None);
        assert_eq!(seen[1].new_value, None);
    }

    #[test]
    fn test_removed_listener_is_not_invoked() {
        let origin = Origin::in_memory("https://app.example").unwrap();
        let writer = origin.open_tab("/").unwrap();
        let reader = origin.open_tab("/").unwrap();
        let (seen, id) = recorder(&reader);

        writer.local_storage().set_item("a", "1").unwrap();
        assert!(reader.remove_listener(id));
        assert!(!reader.remove_listener(id));
        reader.pump();

        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_dropped_contexts_are_pruned() {
        let origin = Origin::in_memory("https://app.example").unwrap();
        let keep = origin.open_tab("/").unwrap();
        {
            let _gone = origin.open_tab("/").unwrap();
            assert_eq!(origin.context_count(), 2);
        }
        assert_eq!(origin.context_count(), 1);

        keep.local_storage().set_item("k", "v").unwrap();
    }

    #[test]
    fn test_concurrent_writers_deliver_events_in_storage_order() {
        let origin = Origin::in_memory("https://app.example").unwrap();
        let first = origin.open_tab("/login.html").unwrap();
        let second = origin.open_tab("/user-center.html").unwrap();
        let reader = origin.open_tab("/").unwrap();
        let (seen, _) = recorder(&reader);

        std::thread::scope(|scope| {
            for (name, context) in [("a", &first), ("b", &second)] {
                scope.spawn(move || {
                    let local = context.local_storage();
                    for i in 0..200 {
                        local.set_item("token", &format!("{}{}", name, i)).unwrap();
                    }
                });
            }
        });
        reader.pump();

        let seen = seen.lock();
        assert_eq!(seen.len(), 400);
        for pair in seen.windows(2) {
            assert_eq!(pair[1].old_value, pair[0].new_value);
        }
        assert_eq!(
            seen[399].new_value,
            reader.local_storage().get_item("token").unwrap()
        );
    }

    #[test]
    fn test_remove_listener_waits_for_running_callback() {
        use std::sync::atomic::AtomicUsize;
        use std::sync::mpsc;
        use std::time::Duration;

        let origin = Origin::in_memory("https://app.example").unwrap();
        let writer = origin.open_tab("/").unwrap();
        let reader = origin.open_tab("/").unwrap();

        let removed = Arc::new(AtomicBool::new(false));
        let late_calls = Arc::new(AtomicUsize::new(0));
        let (started_tx, started_rx) = mpsc::channel();
        let started_tx = Mutex::new(started_tx);

        let id = {
            let removed = Arc::clone(&removed);
            let late_calls = Arc::clone(&late_calls);
            reader.add_listener(Arc::new(move |_event: &StorageEvent| {
                if removed.load(Ordering::SeqCst) {
                    late_calls.fetch_add(1, Ordering::SeqCst);
                }
                let _ = started_tx.lock().send(());
                std::thread::sleep(Duration::from_millis(50));
            }))
        };

        writer.local_storage().set_item("a", "1").unwrap();
        writer.local_storage().set_item("a", "2").unwrap();

        std::thread::scope(|scope| {
            let remover = &reader;
            let removed = &removed;
            scope.spawn(move || {
                started_rx.recv().unwrap();
                assert!(remover.remove_listener(id));
                removed.store(true, Ordering::SeqCst);
            });
            assert_eq!(reader.pump(), 2);
        });

        assert_eq!(late_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_origin_url() {
        assert!(Origin::in_memory("not a url").is_err());
    }
}
