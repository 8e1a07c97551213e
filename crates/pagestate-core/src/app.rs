//! Page bootstrap
//!
//! Each page opens as its own browsing context of the shared origin:
//! resolve the locale, build the store, then hand both to the page.

use std::collections::BTreeSet;

use pagestate_i18n::{Catalog, I18n};
use pagestate_pages::Page;
use pagestate_state::{Account, ChangeWatcher, KeyValueStore, StorageChange, Subscription};
use pagestate_storage::{BrowsingContext, Database, Origin};

use crate::config::Config;
use crate::error::CoreError;
use crate::Result;

pub struct App {
    config: Config,
    origin: Origin,
}

impl App {
    /// Open the durable database named in `config`.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let db = Database::open(&config.database_path)?;
        let origin = Origin::new(&config.origin, db)?;
        Ok(Self { config, origin })
    }

    /// Keep the durable area in memory.
    pub fn in_memory(config: Config) -> Result<Self> {
        config.validate()?;
        let origin = Origin::in_memory(&config.origin)?;
        Ok(Self { config, origin })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Parse a page's messages, falling back to the configured default locale.
    pub fn catalog_from_json(&self, json: &str) -> Result<Catalog> {
        Ok(Catalog::from_json(self.config.default_locale.clone(), json)?)
    }

    /// Open `page` in a new tab with the given messages.
    pub fn open_page(&self, page: Page, catalog: Catalog) -> Result<PageContext> {
        if catalog.locales().is_empty() {
            return Err(CoreError::Config(format!("no messages for page {}", page)));
        }

        let context = self
            .origin
            .open_tab(&format!("/{}", page.entry_document()))?;
        let store = KeyValueStore::for_context(&context);
        let i18n = I18n::create(catalog, store.local_area());

        tracing::info!(
            page = %page,
            context_id = %context.id(),
            locale = %i18n.current_locale(),
            "Opened page"
        );

        Ok(PageContext {
            page,
            watcher: ChangeWatcher::new(context.clone()),
            account: Account::new(store.clone()),
            context,
            store,
            i18n,
        })
    }
}

/// Everything one open page works with
pub struct PageContext {
    page: Page,
    context: BrowsingContext,
    store: KeyValueStore,
    account: Account,
    i18n: I18n,
    watcher: ChangeWatcher,
}

impl PageContext {
    pub fn page(&self) -> Page {
        self.page
    }

    pub fn context(&self) -> &BrowsingContext {
        &self.context
    }

    pub fn store(&self) -> &KeyValueStore {
        &self.store
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn i18n(&self) -> &I18n {
        &self.i18n
    }

    pub fn i18n_mut(&mut self) -> &mut I18n {
        &mut self.i18n
    }

    pub fn available_locales(&self) -> &BTreeSet<String> {
        self.i18n.available_locales()
    }

    pub fn watch<F>(&self, callback: F) -> Subscription
    where
        F: Fn(StorageChange) + Send + Sync + 'static,
    {
        self.watcher.watch(callback)
    }

    /// Deliver storage changes made by other pages since the last call.
    pub fn pump(&self) -> usize {
        self.context.pump()
    }
}
