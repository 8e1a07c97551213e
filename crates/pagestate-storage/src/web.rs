//! Browser-backed storage areas
//!
//! [`WebArea`] looks the platform `Storage` object up on every call instead of
//! holding it, so it stays `Send + Sync` like the other areas. The browser
//! broadcasts changes itself; [`listen`] forwards its `storage` events.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use crate::area::{AreaKind, StorageArea};
use crate::error::StorageError;
use crate::event::StorageEvent;
use crate::Result;

pub struct WebArea {
    kind: AreaKind,
}

impl WebArea {
    pub fn local() -> Self {
        Self {
            kind: AreaKind::Local,
        }
    }

    pub fn session() -> Self {
        Self {
            kind: AreaKind::Session,
        }
    }

    fn storage(&self) -> Result<web_sys::Storage> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
        let storage = match self.kind {
            AreaKind::Local => window.local_storage(),
            AreaKind::Session => window.session_storage(),
        };
        storage
            .map_err(|err| js_error(err, None))?
            .ok_or_else(|| StorageError::Unavailable(format!("{} storage is disabled", self.kind)))
    }
}

fn js_error(err: JsValue, key: Option<&str>) -> StorageError {
    if let Some(exception) = err.dyn_ref::<web_sys::DomException>() {
        if exception.name() == "QuotaExceededError" {
            return StorageError::QuotaExceeded {
                key: key.unwrap_or_default().to_string(),
            };
        }
        return StorageError::Unavailable(exception.message());
    }
    StorageError::Unavailable(format!("{:?}", err))
}

impl StorageArea for WebArea {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.storage()?
            .get_item(key)
            .map_err(|err| js_error(err, Some(key)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<Option<String>> {
        let storage = self.storage()?;
        let previous = storage
            .get_item(key)
            .map_err(|err| js_error(err, Some(key)))?;
        storage
            .set_item(key, value)
            .map_err(|err| js_error(err, Some(key)))?;
        Ok(previous)
    }

    fn remove_item(&self, key: &str) -> Result<Option<String>> {
        let storage = self.storage()?;
        let previous = storage
            .get_item(key)
            .map_err(|err| js_error(err, Some(key)))?;
        storage
            .remove_item(key)
            .map_err(|err| js_error(err, Some(key)))?;
        Ok(previous)
    }

    fn clear(&self) -> Result<usize> {
        let storage = self.storage()?;
        let removed = storage.length().map_err(|err| js_error(err, None))? as usize;
        storage.clear().map_err(|err| js_error(err, None))?;
        Ok(removed)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let storage = self.storage()?;
        let len = storage.length().map_err(|err| js_error(err, None))?;
        let mut keys = Vec::with_capacity(len as usize);
        for index in 0..len {
            if let Some(key) = storage.key(index).map_err(|err| js_error(err, None))? {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

/// Registration of a window `storage` listener. Dropping it removes the
/// listener.
pub struct WebListener {
    window: web_sys::Window,
    closure: Closure<dyn FnMut(web_sys::StorageEvent)>,
}

impl Drop for WebListener {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("storage", self.closure.as_ref().unchecked_ref());
    }
}

/// Forward the window's `storage` events to `callback`.
pub fn listen<F>(mut callback: F) -> Result<WebListener>
where
    F: FnMut(StorageEvent) + 'static,
{
    let window =
        web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
    let local = window.local_storage().ok().flatten();

    let closure = Closure::<dyn FnMut(web_sys::StorageEvent)>::new(
        move |event: web_sys::StorageEvent| {
            let area = match (event.storage_area(), local.as_ref()) {
                (Some(area), Some(local)) if &area == local => AreaKind::Local,
                _ => AreaKind::Session,
            };
            callback(StorageEvent {
                area,
                key: event.key(),
                old_value: event.old_value(),
                new_value: event.new_value(),
                url: event.url(),
            });
        },
    );

    window
        .add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref())
        .map_err(|err| js_error(err, None))?;

    Ok(WebListener { window, closure })
}
