//! Where the bearer token and signed-in user are kept.
//!
//! "Remember me" logins go to the persistent scope, everything else to the
//! session scope. Reads prefer the session scope.

use crate::{
    api::types::UserResponse,
    error::StorageError,
    storage::{ClientStorage, StorageScope},
};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const REMEMBER_ME_KEY: &str = "rememberMe";

#[derive(Clone)]
pub struct CredentialStore {
    storage: ClientStorage,
}

impl CredentialStore {
    pub fn new(storage: ClientStorage) -> Self {
        Self { storage }
    }

    pub fn save(
        &self,
        token: &str,
        user: &UserResponse,
        remember_me: bool,
    ) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(user).map_err(|source| StorageError::Encode {
            key: USER_KEY.to_string(),
            source,
        })?;
        let scope = if remember_me {
            StorageScope::Persistent
        } else {
            StorageScope::Session
        };
        let store = self.storage.scope(scope);
        store.set_item(TOKEN_KEY, token)?;
        store.set_item(USER_KEY, &encoded)?;
        if remember_me {
            store.set_item(REMEMBER_ME_KEY, "true")?;
        }
        Ok(())
    }

    fn read(&self, key: &str) -> Option<String> {
        [StorageScope::Session, StorageScope::Persistent]
            .into_iter()
            .find_map(|scope| match self.storage.scope(scope).get_item(key) {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(key, ?scope, error = %err, "failed to read credentials");
                    None
                }
            })
    }

    pub fn token(&self) -> Option<String> {
        self.read(TOKEN_KEY)
    }

    pub fn user(&self) -> Option<UserResponse> {
        let raw = self.read(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                tracing::warn!(error = %err, "stored user is corrupt");
                None
            }
        }
    }

    pub fn remember_me(&self) -> bool {
        self.read(REMEMBER_ME_KEY).as_deref() == Some("true")
    }

    /// Removes every credential slot in both scopes.
    pub fn clear(&self) {
        for (store, keys) in [
            (self.storage.session(), &[TOKEN_KEY, USER_KEY][..]),
            (
                self.storage.persistent(),
                &[TOKEN_KEY, USER_KEY, REMEMBER_ME_KEY][..],
            ),
        ] {
            for key in keys {
                if let Err(err) = store.remove_item(key) {
                    tracing::warn!(key, error = %err, "failed to clear credential");
                }
            }
        }
    }
}
