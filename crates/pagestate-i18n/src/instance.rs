//! Per-page i18n instance: a catalog plus the locale chosen for it

use std::collections::BTreeSet;
use std::sync::Arc;

use pagestate_storage::StorageArea;

use crate::catalog::Catalog;
use crate::resolver::{LocaleResolver, SwitchOutcome};
use crate::Result;

pub struct I18n {
    catalog: Catalog,
    resolver: LocaleResolver,
}

impl I18n {
    /// Resolve the active locale against the catalog's locales, defaulting
    /// (and falling back for missing keys) to the catalog's fallback locale.
    pub fn create(catalog: Catalog, preferences: Arc<dyn StorageArea>) -> Self {
        let mut resolver = LocaleResolver::with_area(preferences);
        let fallback = catalog.fallback().to_string();
        resolver.resolve(catalog.locales(), &fallback);

        Self { catalog, resolver }
    }

    pub fn t(&self, key: &str) -> String {
        self.t_with(key, &[])
    }

    pub fn t_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        self.catalog.translate(self.current_locale(), key, args)
    }

    pub fn switch_locale(&mut self, locale: &str) -> Result<SwitchOutcome> {
        self.resolver.switch(locale)
    }

    pub fn current_locale(&self) -> &str {
        self.resolver
            .current()
            .unwrap_or_else(|| self.catalog.fallback())
    }

    pub fn available_locales(&self) -> &BTreeSet<String> {
        self.resolver.available()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
