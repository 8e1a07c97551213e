//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] pagestate_storage::StorageError),

    #[error("State error: {0}")]
    State(#[from] pagestate_state::StateError),

    #[error("i18n error: {0}")]
    I18n(#[from] pagestate_i18n::I18nError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
