//! Locale resolution
//!
//! ```text
//! Unresolved
//!   ↓ resolve(available, default)
//! Resolved(L1)
//!   ↓ switch(L2), only if L2 ∈ available
//! Resolved(L2)
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use pagestate_storage::StorageArea;

use crate::Result;

/// Durable-area key holding the preferred locale id
pub const LOCALE_KEY: &str = "app-locale";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleState {
    Unresolved,
    Resolved(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    Switched { from: String, to: String },
    /// Already the active locale; the preference was still written
    Unchanged,
    /// Not in the available set; nothing changed
    Rejected(String),
}

pub struct LocaleResolver {
    preferences: Arc<dyn StorageArea>,
    available: BTreeSet<String>,
    state: LocaleState,
}

impl LocaleResolver {
    pub fn new(preferences: impl StorageArea + 'static) -> Self {
        Self::with_area(Arc::new(preferences))
    }

    /// Share an area another component already holds, such as
    /// `KeyValueStore::local_area`.
    pub fn with_area(preferences: Arc<dyn StorageArea>) -> Self {
        Self {
            preferences,
            available: BTreeSet::new(),
            state: LocaleState::Unresolved,
        }
    }

    /// Pick the saved preference if it is one of `available`, otherwise
    /// `default`. Never fails: an unreadable preference counts as absent.
    pub fn resolve<I, S>(&mut self, available: I, default: &str) -> String
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available = available.into_iter().map(Into::into).collect();

        if !self.available.contains(default) {
            tracing::warn!(locale = %default, "Default locale is not among the available locales");
        }

        let saved = self.preferences.get_item(LOCALE_KEY).unwrap_or_else(|e| {
            tracing::error!("Failed to read locale preference: {}", e);
            None
        });

        let locale = match saved {
            Some(saved) if self.available.contains(&saved) => saved,
            Some(saved) => {
                tracing::debug!(saved = %saved, "Ignoring unavailable saved locale");
                default.to_string()
            }
            None => default.to_string(),
        };

        tracing::info!(locale = %locale, "Resolved locale");

        self.state = LocaleState::Resolved(locale.clone());
        locale
    }

    /// Make `locale` active and remember it. Unknown locales are reported and
    /// ignored. Storage failures propagate and leave the active locale as it was.
    pub fn switch(&mut self, locale: &str) -> Result<SwitchOutcome> {
        let LocaleState::Resolved(current) = &self.state else {
            tracing::warn!(locale = %locale, "Locale switch before resolution ignored");
            return Ok(SwitchOutcome::Rejected(locale.to_string()));
        };

        if !self.available.contains(locale) {
            tracing::warn!(
                locale = %locale,
                available = ?self.available,
                "Ignoring switch to unavailable locale"
            );
            return Ok(SwitchOutcome::Rejected(locale.to_string()));
        }

        self.preferences.set_item(LOCALE_KEY, locale)?;

        if current == locale {
            return Ok(SwitchOutcome::Unchanged);
        }

        let from = current.clone();
        self.state = LocaleState::Resolved(locale.to_string());

        tracing::info!(from = %from, to = %locale, "Switched locale");

        Ok(SwitchOutcome::Switched {
            from,
            to: locale.to_string(),
        })
    }

    pub fn current(&self) -> Option<&str> {
        match &self.state {
            LocaleState::Resolved(locale) => Some(locale.as_str()),
            LocaleState::Unresolved => None,
        }
    }

    pub fn available(&self) -> &BTreeSet<String> {
        &self.available
    }

    pub fn state(&self) -> &LocaleState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagestate_storage::{MemoryArea, StorageError};

    fn resolver_with(saved: Option<&str>) -> (LocaleResolver, MemoryArea) {
        let area = MemoryArea::new();
        if let Some(saved) = saved {
            area.set_item(LOCALE_KEY, saved).unwrap();
        }
        (LocaleResolver::new(area.clone()), area)
    }

    #[test]
    fn test_saved_preference_wins() {
        let (mut resolver, _) = resolver_with(Some("en"));
        assert_eq!(resolver.resolve(["en", "zh"], "zh"), "en");
        assert_eq!(resolver.current(), Some("en"));
    }

    #[test]
    fn test_unavailable_or_missing_preference_falls_back() {
        let (mut resolver, _) = resolver_with(Some("fr"));
        assert_eq!(resolver.resolve(["en", "zh"], "zh"), "zh");

        let (mut resolver, _) = resolver_with(None);
        assert_eq!(resolver.resolve(["en", "zh"], "zh"), "zh");
    }

    #[test]
    fn test_unresolved_until_resolve() {
        let (mut resolver, area) = resolver_with(None);
        assert_eq!(resolver.state(), &LocaleState::Unresolved);
        assert_eq!(resolver.current(), None);

        assert_eq!(
            resolver.switch("en").unwrap(),
            SwitchOutcome::Rejected("en".to_string())
        );
        assert_eq!(area.get_item(LOCALE_KEY).unwrap(), None);
    }

    #[test]
    fn test_switch_persists() {
        let (mut resolver, area) = resolver_with(None);
        resolver.resolve(["en", "zh"], "zh");

        assert_eq!(
            resolver.switch("en").unwrap(),
            SwitchOutcome::Switched {
                from: "zh".to_string(),
                to: "en".to_string()
            }
        );
        assert_eq!(resolver.current(), Some("en"));
        assert_eq!(area.get_item(LOCALE_KEY).unwrap(), Some("en".to_string()));

        // A later resolution picks the switch up
        let mut next = LocaleResolver::new(area);
        assert_eq!(next.resolve(["en", "zh"], "zh"), "en");
    }

    #[test]
    fn test_switch_to_unavailable_locale_is_ignored() {
        let (mut resolver, area) = resolver_with(None);
        resolver.resolve(["en", "zh"], "zh");

        assert_eq!(
            resolver.switch("fr").unwrap(),
            SwitchOutcome::Rejected("fr".to_string())
        );
        assert_eq!(resolver.current(), Some("zh"));
        assert_eq!(area.get_item(LOCALE_KEY).unwrap(), None);
    }

    #[test]
    fn test_switch_to_current_locale() {
        let (mut resolver, area) = resolver_with(None);
        resolver.resolve(["en", "zh"], "zh");
        assert_eq!(resolver.switch("zh").unwrap(), SwitchOutcome::Unchanged);
        assert_eq!(area.get_item(LOCALE_KEY).unwrap(), Some("zh".to_string()));
    }

    #[test]
    fn test_failed_persist_keeps_locale() {
        let area = MemoryArea::with_quota(4);
        let mut resolver = LocaleResolver::new(area);
        resolver.resolve(["en", "zh"], "zh");

        let err = resolver.switch("en").unwrap_err();
        assert!(matches!(
            err,
            crate::I18nError::Storage(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(resolver.current(), Some("zh"));
    }

    #[test]
    fn test_accessors() {
        let (mut resolver, _) = resolver_with(None);
        resolver.resolve(vec!["zh-CN".to_string(), "en-US".to_string()], "zh-CN");
        let available: Vec<&str> = resolver.available().iter().map(String::as_str).collect();
        assert_eq!(available, vec!["en-US", "zh-CN"]);
    }
}
