use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::compress::DEFAULT_MAX_UPLOAD_BYTES;

pub const DEFAULT_SETTINGS_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSettings {
    pub base_url: String,
    pub database_url: String,
    pub max_upload_bytes: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/v1".into(),
            database_url: "sqlite://./data/client.db".into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

pub fn load_settings() -> Result<ClientSettings> {
    load_settings_from(Path::new(DEFAULT_SETTINGS_FILE))
}

/// Defaults, then the optional TOML file, then `APP__*` variables
/// (e.g. `APP__BASE_URL`).
pub fn load_settings_from(path: &Path) -> Result<ClientSettings> {
    let defaults = ClientSettings::default();
    let settings = Config::builder()
        .set_default("base_url", defaults.base_url)?
        .set_default("database_url", defaults.database_url)?
        .set_default("max_upload_bytes", defaults.max_upload_bytes as i64)?
        .add_source(
            File::from(path)
                .format(FileFormat::Toml)
                .required(false),
        )
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("failed to load settings from '{}'", path.display()))?;

    settings
        .try_deserialize()
        .context("invalid client settings")
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
