//! pagestate Storage Layer
//!
//! Two key-value areas per browsing context:
//! - the durable area (`localStorage`), shared by every context of an origin
//! - the session area (`sessionStorage`), scoped to a tab and its frames
//!
//! Writes made through one context are delivered to the other contexts of the
//! same origin as [`StorageEvent`]s. The writer never sees its own events.

mod area;
mod context;
#[cfg(not(target_arch = "wasm32"))]
mod database;
mod error;
mod event;
mod memory;
#[cfg(not(target_arch = "wasm32"))]
mod migrations;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub mod web;

pub use area::{AreaKind, StorageArea};
pub use context::{AreaHandle, BrowsingContext, ContextId, Origin};
#[cfg(not(target_arch = "wasm32"))]
pub use database::Database;
pub use error::StorageError;
pub use event::{Listener, ListenerId, StorageEvent, StorageEvents};
pub use memory::MemoryArea;

pub type Result<T> = std::result::Result<T, StorageError>;
