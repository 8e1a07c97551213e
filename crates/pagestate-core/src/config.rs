//! Application configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the durable storage database
    pub database_path: PathBuf,
    /// Origin the pages are served from
    pub origin: String,
    /// Locale used when no saved preference applies, and for missing messages
    pub default_locale: String,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("storage.db"),
            origin: "http://localhost:5173".to_string(),
            default_locale: "zh-CN".to_string(),
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("pagestate"))
            .unwrap_or_else(|| PathBuf::from(".pagestate"))
    }

    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.origin)
            .map_err(|e| CoreError::Config(format!("invalid origin '{}': {}", self.origin, e)))?;

        if self.default_locale.trim().is_empty() {
            return Err(CoreError::Config("default locale cannot be empty".to_string()));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::new(PathBuf::from("/tmp/pagestate"));
        assert_eq!(config.database_path, PathBuf::from("/tmp/pagestate/storage.db"));
        config.validate().unwrap();
    }

    #[test]
    fn test_default_lives_under_platform_data_dir() {
        let config = Config::default();
        match dirs::data_local_dir() {
            Some(base) => assert!(config.database_path.starts_with(base.join("pagestate"))),
            None => assert!(config.database_path.starts_with(".pagestate")),
        }
        assert!(config.database_path.ends_with("storage.db"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"default_locale": "en-US"}"#).unwrap();

        let config = Config::from_json_file(&path).unwrap();
        assert_eq!(config.default_locale, "en-US");
        assert_eq!(config.origin, Config::default().origin);
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"origin": "::nope"}"#).unwrap();

        assert!(matches!(
            Config::from_json_file(&path),
            Err(CoreError::Config(_))
        ));
    }
}
