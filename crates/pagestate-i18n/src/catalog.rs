//! Message catalog with locale fallback and interpolation.
//!
//! Messages are nested JSON objects addressed with dotted keys
//! (`"message.tokenStatus"`). A key missing from the requested locale is
//! looked up in the fallback locale. `{name}` tokens are replaced in a single
//! pass; tokens without a matching argument are left as-is.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::I18nError;
use crate::Result;

#[derive(Debug, Clone)]
pub struct Catalog {
    messages: BTreeMap<String, Map<String, Value>>,
    fallback: String,
}

impl Catalog {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            messages: BTreeMap::new(),
            fallback: fallback.into(),
        }
    }

    /// Parse `{"<locale>": {...messages}, ...}`.
    pub fn from_json(fallback: impl Into<String>, json: &str) -> Result<Self> {
        let locales: Map<String, Value> = serde_json::from_str(json)?;
        let mut catalog = Self::new(fallback);
        for (locale, messages) in locales {
            catalog.add_locale(locale, messages)?;
        }
        Ok(catalog)
    }

    pub fn add_locale(&mut self, locale: impl Into<String>, messages: Value) -> Result<()> {
        let locale = locale.into();
        match messages {
            Value::Object(map) => {
                self.messages.insert(locale, map);
                Ok(())
            }
            _ => Err(I18nError::InvalidMessages(locale)),
        }
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn locales(&self) -> BTreeSet<String> {
        self.messages.keys().cloned().collect()
    }

    pub fn has_locale(&self, locale: &str) -> bool {
        self.messages.contains_key(locale)
    }

    /// Look `key` up in `locale`, then in the fallback locale.
    pub fn get(&self, locale: &str, key: &str) -> Option<&str> {
        self.lookup(locale, key)
            .or_else(|| self.lookup(&self.fallback, key))
    }

    pub fn format(&self, locale: &str, key: &str, args: &[(&str, &str)]) -> Option<String> {
        self.get(locale, key)
            .map(|template| interpolate(template, args))
    }

    /// Like [`Catalog::format`], but a missing key renders as the key itself.
    pub fn translate(&self, locale: &str, key: &str, args: &[(&str, &str)]) -> String {
        self.format(locale, key, args).unwrap_or_else(|| {
            tracing::warn!(locale = %locale, key = %key, "Missing message");
            key.to_string()
        })
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&str> {
        let mut parts = key.split('.');
        let first = parts.next()?;
        let mut node = self.messages.get(locale)?.get(first)?;
        for part in parts {
            node = node.as_object()?.get(part)?;
        }
        node.as_str()
    }
}

fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };

        let name = after[..end].trim();
        match args.iter().find(|(arg, _)| *arg == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 2]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new("zh-CN");
        catalog
            .add_locale(
                "zh-CN",
                json!({
                    "title": "用户中心",
                    "message": { "tokenStatus": "Token: {token}", "noToken": "未找到Token" }
                }),
            )
            .unwrap();
        catalog
            .add_locale(
                "en-US",
                json!({
                    "title": "User Center",
                    "message": { "tokenStatus": "Token: {token}" }
                }),
            )
            .unwrap();
        catalog
    }

    #[test]
    fn test_nested_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.get("en-US", "title"), Some("User Center"));
        assert_eq!(catalog.get("zh-CN", "message.noToken"), Some("未找到Token"));
        assert_eq!(catalog.get("en-US", "message"), None);
        assert_eq!(catalog.get("en-US", "title.deeper"), None);
    }

    #[test]
    fn test_fallback_locale() {
        let catalog = catalog();
        assert_eq!(catalog.get("en-US", "message.noToken"), Some("未找到Token"));
        assert_eq!(catalog.get("fr-FR", "title"), Some("用户中心"));
        assert_eq!(catalog.get("en-US", "missing.key"), None);
    }

    #[test]
    fn test_interpolation() {
        let catalog = catalog();
        assert_eq!(
            catalog.format("en-US", "message.tokenStatus", &[("token", "abc123")]),
            Some("Token: abc123".to_string())
        );
        assert_eq!(interpolate("{missing} and {x}", &[("x", "1")]), "{missing} and 1");
        assert_eq!(interpolate("open { brace", &[]), "open { brace");
        assert_eq!(interpolate("{a}{a}", &[("a", "{a}")]), "{a}{a}");
    }

    #[test]
    fn test_translate_missing_key_renders_key() {
        let catalog = catalog();
        assert_eq!(catalog.translate("en-US", "nope", &[]), "nope");
    }

    #[test]
    fn test_from_json() {
        let catalog =
            Catalog::from_json("en-US", r#"{"en-US": {"title": "User Login"}, "zh-CN": {}}"#)
                .unwrap();
        let locales: Vec<String> = catalog.locales().into_iter().collect();
        assert_eq!(locales, vec!["en-US", "zh-CN"]);
        assert!(catalog.has_locale("zh-CN"));
        assert_eq!(catalog.fallback(), "en-US");

        assert!(matches!(
            Catalog::from_json("en-US", r#"{"en-US": "flat"}"#),
            Err(I18nError::InvalidMessages(_))
        ));
        assert!(Catalog::from_json("en-US", "not json").is_err());
    }
}
