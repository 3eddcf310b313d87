use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{Session, UserId},
    preferences::{PreferenceKey, PreferenceStore},
    protocol::LoginResult,
};
use tokio::sync::RwLock;
use tracing::info;

/// Sole owner of the persisted [`Session`]. Controllers receive it by `Arc`.
pub struct SessionStore {
    preferences: Arc<dyn PreferenceStore>,
}

impl SessionStore {
    pub fn new(preferences: Arc<dyn PreferenceStore>) -> Self {
        Self { preferences }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryPreferences::default()))
    }

    /// Writes empty entries for every key that has never been stored.
    pub async fn init(&self) -> Result<Session> {
        for key in PreferenceKey::ALL {
            if self.preferences.get(key).await?.is_none() {
                let empty = if key == PreferenceKey::DarkMode {
                    "false"
                } else {
                    ""
                };
                self.preferences.set(key, empty).await?;
            }
        }
        self.load().await
    }

    pub async fn load(&self) -> Result<Session> {
        let prefs = &self.preferences;
        Ok(Session {
            user_id: UserId(prefs.get(PreferenceKey::UserId).await?.unwrap_or_default()),
            user_name: prefs.get(PreferenceKey::UserName).await?.unwrap_or_default(),
            user_email: prefs
                .get(PreferenceKey::UserEmail)
                .await?
                .unwrap_or_default(),
            auth_token: prefs.get(PreferenceKey::UserToken).await?,
            dark_mode_enabled: prefs.get_bool(PreferenceKey::DarkMode).await?,
        })
    }

    /// Stored token, if one is present and non-empty.
    pub async fn auth_token(&self) -> Result<Option<String>> {
        Ok(self
            .preferences
            .get(PreferenceKey::UserToken)
            .await?
            .filter(|token| !token.is_empty()))
    }

    pub async fn save_login(&self, result: &LoginResult) -> Result<()> {
        self.preferences
            .set(PreferenceKey::UserId, result.user_id.as_str())
            .await?;
        self.preferences
            .set(PreferenceKey::UserName, &result.name)
            .await?;
        self.preferences
            .set(PreferenceKey::UserToken, &result.token)
            .await?;
        info!(user_id = %result.user_id, "session: login stored");
        Ok(())
    }

    pub async fn set_user_email(&self, email: &str) -> Result<()> {
        self.preferences.set(PreferenceKey::UserEmail, email).await
    }

    pub async fn set_dark_mode(&self, enabled: bool) -> Result<()> {
        self.preferences
            .set_bool(PreferenceKey::DarkMode, enabled)
            .await
    }

    /// Logout: identity fields become empty strings, the theme flag stays.
    pub async fn clear(&self) -> Result<()> {
        for key in [
            PreferenceKey::UserId,
            PreferenceKey::UserName,
            PreferenceKey::UserToken,
            PreferenceKey::UserEmail,
        ] {
            self.preferences.set(key, "").await?;
        }
        info!("session: cleared");
        Ok(())
    }
}

/// Process-local preference store.
#[derive(Default)]
pub struct MemoryPreferences {
    values: RwLock<HashMap<PreferenceKey, String>>,
}

#[async_trait]
impl PreferenceStore for MemoryPreferences {
    async fn get(&self, key: PreferenceKey) -> Result<Option<String>> {
        Ok(self.values.read().await.get(&key).cloned())
    }

    async fn set(&self, key: PreferenceKey, value: &str) -> Result<()> {
        self.values.write().await.insert(key, value.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
