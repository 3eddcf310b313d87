use anyhow::Result;
use async_trait::async_trait;

/// Keys of the locally persisted key-value entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    UserId,
    UserName,
    UserEmail,
    UserToken,
    DarkMode,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 5] = [
        PreferenceKey::UserId,
        PreferenceKey::UserName,
        PreferenceKey::UserEmail,
        PreferenceKey::UserToken,
        PreferenceKey::DarkMode,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PreferenceKey::UserId => "user_id",
            PreferenceKey::UserName => "user_name",
            PreferenceKey::UserEmail => "user_email",
            PreferenceKey::UserToken => "user_token",
            PreferenceKey::DarkMode => "dark_mode",
        }
    }
}

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: PreferenceKey) -> Result<Option<String>>;
    async fn set(&self, key: PreferenceKey, value: &str) -> Result<()>;

    async fn get_bool(&self, key: PreferenceKey) -> Result<bool> {
        Ok(self.get(key).await?.as_deref() == Some("true"))
    }

    async fn set_bool(&self, key: PreferenceKey, value: bool) -> Result<()> {
        self.set(key, if value { "true" } else { "false" }).await
    }
}
