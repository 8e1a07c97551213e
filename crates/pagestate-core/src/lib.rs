//! pagestate Core
//!
//! Wires the storage, state and i18n crates together for each page.
//! State is injected, never global: every page gets its own context, store
//! and locale resolver, all sharing the origin's durable area.

mod app;
mod config;
mod error;

pub use app::{App, PageContext};
pub use config::Config;
pub use error::CoreError;

// Re-export core components
pub use pagestate_i18n::{Catalog, I18n, I18nError, LocaleResolver, SwitchOutcome, LOCALE_KEY};
pub use pagestate_pages::{Page, PageEntrySelector, PageRequest, PageSelection, BUILD_PAGES_ENV};
pub use pagestate_state::{
    Account, ChangeWatcher, Credentials, KeyValueStore, StateError, StorageChange, Subscription,
    UserRecord,
};
pub use pagestate_storage::{BrowsingContext, Database, MemoryArea, Origin, StorageArea, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
