//! State error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Storage error: {0}")]
    Storage(#[from] pagestate_storage::StorageError),

    #[error("Stored value for '{key}' is not valid: {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Username and password are required")]
    MissingCredentials,
}
