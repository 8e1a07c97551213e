//! pagestate State
//!
//! Typed accessors over the durable and session storage areas:
//! - the signed-in user record and its token live in the durable area
//! - per-tab scratch data lives in the session area
//! - other tabs learn about durable changes through [`ChangeWatcher`]
//!
//! Nothing here is a global. Build one [`KeyValueStore`] per context and pass
//! it to whatever needs it.

mod account;
mod error;
mod store;
mod watcher;

pub use account::{Account, Credentials, UserRecord};
pub use error::StateError;
pub use store::{KeyValueStore, TOKEN_KEY, USER_KEY};
pub use watcher::{ChangeWatcher, StorageChange, Subscription};

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use watcher::watch_browser;

pub type Result<T> = std::result::Result<T, StateError>;
