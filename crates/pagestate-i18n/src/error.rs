//! i18n error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum I18nError {
    #[error("Storage error: {0}")]
    Storage(#[from] pagestate_storage::StorageError),

    #[error("Invalid message catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Messages for locale '{0}' must be an object")]
    InvalidMessages(String),
}
