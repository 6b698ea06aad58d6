use shared::domain::User;
use tokio::sync::Mutex;
use tracing::warn;

use crate::{
    error::Result,
    storage::{LocalStorage, MemoryLocalStorage},
};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Token and last confirmed user snapshot. Callers read whole snapshots and
/// write whole replacements; nothing is patched in place.
pub struct SessionStore {
    storage: Mutex<Box<dyn LocalStorage>>,
}

impl SessionStore {
    pub fn new(storage: impl LocalStorage + 'static) -> Self {
        Self {
            storage: Mutex::new(Box::new(storage)),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryLocalStorage::new())
    }

    pub async fn token(&self) -> Result<Option<String>> {
        let storage = self.storage.lock().await;
        Ok(storage
            .get_item(TOKEN_KEY)?
            .filter(|token| !token.trim().is_empty()))
    }

    pub async fn user(&self) -> Result<Option<User>> {
        let raw = self.storage.lock().await.get_item(USER_KEY)?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                warn!("session: stored user is unreadable, treating as absent error={err}");
                Ok(None)
            }
        }
    }

    pub async fn set_user(&self, user: &User) -> Result<()> {
        let encoded = serde_json::to_string(user)?;
        self.storage.lock().await.set_item(USER_KEY, &encoded)
    }

    /// Stores a freshly issued token together with its user.
    pub async fn start(&self, token: &str, user: &User) -> Result<()> {
        let encoded = serde_json::to_string(user)?;
        self.storage
            .lock()
            .await
            .set_items(&[(TOKEN_KEY, token), (USER_KEY, encoded.as_str())])
    }

    pub async fn is_authenticated(&self) -> bool {
        match self.token().await {
            Ok(token) => token.is_some(),
            Err(err) => {
                warn!("session: token lookup failed error={err}");
                false
            }
        }
    }

    pub async fn clear(&self) -> Result<()> {
        self.storage
            .lock()
            .await
            .remove_items(&[TOKEN_KEY, USER_KEY])
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
