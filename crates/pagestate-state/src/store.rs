//! Key-value store over the durable and session areas

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use pagestate_storage::{BrowsingContext, MemoryArea, StorageArea};

use crate::error::StateError;
use crate::Result;

/// Durable-area key holding the JSON user record
pub const USER_KEY: &str = "user";
/// Durable-area key holding the raw token string
pub const TOKEN_KEY: &str = "token";

pub struct KeyValueStore {
    /// Durable area, shared across contexts
    local: Arc<dyn StorageArea>,
    /// Session area, scoped to the tab
    session: Arc<dyn StorageArea>,
}

impl KeyValueStore {
    pub fn new(local: impl StorageArea + 'static, session: impl StorageArea + 'static) -> Self {
        Self {
            local: Arc::new(local),
            session: Arc::new(session),
        }
    }

    /// A store whose writes are seen by the other contexts of `context`'s origin.
    pub fn for_context(context: &BrowsingContext) -> Self {
        Self::new(context.local_storage(), context.session_storage())
    }

    /// Two fresh, unconnected in-memory areas.
    pub fn in_memory() -> Self {
        Self::new(MemoryArea::new(), MemoryArea::new())
    }

    /// The durable area, for collaborators that keep their own keys there.
    pub fn local_area(&self) -> Arc<dyn StorageArea> {
        Arc::clone(&self.local)
    }

    // === User (durable) ===

    pub fn set_user<T: Serialize + ?Sized>(&self, user: &T) -> Result<()> {
        write_json(self.local.as_ref(), USER_KEY, user)?;
        tracing::debug!("Stored user record");
        Ok(())
    }

    /// `Ok(None)` when no user is stored; an error when the stored text does
    /// not parse as `T`.
    pub fn get_user<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        read_json(self.local.as_ref(), USER_KEY)
    }

    pub fn clear_user(&self) -> Result<()> {
        self.local.remove_item(USER_KEY)?;
        Ok(())
    }

    // === Token (durable, stored verbatim) ===

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.local.set_item(TOKEN_KEY, token)?;
        tracing::debug!("Stored token");
        Ok(())
    }

    pub fn get_token(&self) -> Result<Option<String>> {
        Ok(self.local.get_item(TOKEN_KEY)?)
    }

    pub fn clear_token(&self) -> Result<()> {
        self.local.remove_item(TOKEN_KEY)?;
        Ok(())
    }

    // === Session data ===

    pub fn set_session_data<T: Serialize + ?Sized>(&self, key: &str, data: &T) -> Result<()> {
        write_json(self.session.as_ref(), key, data)?;
        tracing::debug!(key = %key, "Stored session data");
        Ok(())
    }

    pub fn get_session_data<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        read_json(self.session.as_ref(), key)
    }

    pub fn clear_session_data(&self, key: &str) -> Result<()> {
        self.session.remove_item(key)?;
        Ok(())
    }

    /// Empty both areas, including keys this store does not own.
    pub fn clear_all(&self) -> Result<()> {
        let local = self.local.clear()?;
        let session = self.session.clear()?;

        tracing::info!(
            local_removed = local,
            session_removed = session,
            "Cleared all stored state"
        );

        Ok(())
    }
}

impl Clone for KeyValueStore {
    fn clone(&self) -> Self {
        Self {
            local: Arc::clone(&self.local),
            session: Arc::clone(&self.session),
        }
    }
}

fn write_json<T: Serialize + ?Sized>(area: &dyn StorageArea, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    area.set_item(key, &json)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(area: &dyn StorageArea, key: &str) -> Result<Option<T>> {
    let Some(raw) = area.get_item(key)? else {
        return Ok(None);
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StateError::Deserialize {
            key: key.to_string(),
            source,
        })
}
