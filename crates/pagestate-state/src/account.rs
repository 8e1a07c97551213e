//! Sign-in flows used by the login and user-center pages
//!
//! Login writes the user record and a fresh token to the durable area, so
//! every other open page sees the sign-in through its [`ChangeWatcher`].
//!
//! [`ChangeWatcher`]: crate::ChangeWatcher

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pagestate_storage::StorageArea;

use crate::error::StateError;
use crate::store::{KeyValueStore, USER_KEY};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub nickname: String,
    pub login_time: DateTime<Utc>,
    /// Previous login time of the same user, if this browser has seen one
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

pub struct Account {
    store: KeyValueStore,
}

impl Account {
    pub fn new(store: KeyValueStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &KeyValueStore {
        &self.store
    }

    /// Sign in, replacing whatever user and token were stored. If the token
    /// cannot be written, the previous user record is put back.
    pub fn login(&self, credentials: &Credentials) -> Result<UserRecord> {
        let username = credentials.username.trim();
        if username.is_empty() || credentials.password.is_empty() {
            return Err(StateError::MissingCredentials);
        }

        // A corrupt previous record must not block signing in again
        let previous = self.store.get_user::<UserRecord>().unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable user record: {}", e);
            None
        });
        let last_login = previous
            .filter(|user| user.username == username)
            .map(|user| user.login_time);

        let user = UserRecord {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            nickname: username.to_string(),
            login_time: Utc::now(),
            last_login,
        };
        let token = Uuid::new_v4().simple().to_string();

        let local = self.store.local_area();
        let previous_raw = local.get_item(USER_KEY)?;

        self.store.set_user(&user)?;
        if let Err(e) = self.store.set_token(&token) {
            let restored = match &previous_raw {
                Some(raw) => local.set_item(USER_KEY, raw).map(|_| ()),
                None => local.remove_item(USER_KEY).map(|_| ()),
            };
            if let Err(restore_err) = restored {
                tracing::error!("Failed to restore user record: {}", restore_err);
            }
            return Err(e);
        }

        tracing::info!(user_id = %user.id, username = %user.username, "Logged in");

        Ok(user)
    }

    pub fn current_user(&self) -> Result<Option<UserRecord>> {
        self.store.get_user()
    }

    /// Append `suffix` to the stored nickname and write the record back.
    pub fn update_user_info(&self, suffix: &str) -> Result<UserRecord> {
        let mut user = self
            .store
            .get_user::<UserRecord>()?
            .ok_or(StateError::NotLoggedIn)?;

        user.nickname = format!("{}{}", user.nickname, suffix);
        self.store.set_user(&user)?;

        Ok(user)
    }

    pub fn token_status(&self) -> Result<Option<String>> {
        self.store.get_token()
    }

    pub fn logout(&self) -> Result<()> {
        self.store.clear_user()?;
        self.store.clear_token()?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Full reset of both areas, not just this account's keys.
    pub fn clear_all_data(&self) -> Result<()> {
        self.store.clear_all()
    }
}
