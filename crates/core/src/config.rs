//! Application configuration.
//!
//! Values are layered: built-in defaults, then the JSON file returned by
//! [`config_path`], then `DECKBUILD_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use ::config::{Config, Environment, File, FileFormat};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    images::HttpFetcher,
    paths::{Layout, DEFAULT_IMAGE_EXTENSION, DEFAULT_IMAGE_FILENAME, DEFAULT_INFO_FILENAME},
    repository::Store,
};

/// Directory under the user's config/data directories.
pub const APP_DIR: &str = "deckbuild";

/// Runtime settings for the storage engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory containing one sub-directory per game.
    pub data_root: PathBuf,
    /// Descriptor filename for games and collections.
    pub info_filename: String,
    /// Sidecar image filename for games and collections.
    pub image_filename: String,
    /// Extension of deck sidecar images.
    pub image_extension: String,
    /// Upper bound on a single image download.
    pub download_timeout_secs: u64,
    /// User agent sent with image downloads.
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_root: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("games"),
            info_filename: DEFAULT_INFO_FILENAME.to_string(),
            image_filename: DEFAULT_IMAGE_FILENAME.to_string(),
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            download_timeout_secs: 30,
            user_agent: concat!("deckbuild/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the default config file and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load using `path` as the config file. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(
                File::from(path)
                    .format(FileFormat::Json)
                    .required(false),
            )
            .add_source(Environment::with_prefix("DECKBUILD").try_parsing(true))
            .build()
            .with_context(|| format!("failed to load configuration from {}", path.display()))?;

        settings
            .try_deserialize()
            .context("invalid configuration values")
    }

    /// Path layout described by this configuration.
    pub fn layout(&self) -> Layout {
        Layout::new(&self.data_root).with_filenames(
            &self.info_filename,
            &self.image_filename,
            &self.image_extension,
        )
    }

    /// HTTP image fetcher honouring the configured timeout.
    pub fn fetcher(&self) -> Result<HttpFetcher> {
        HttpFetcher::new(
            Duration::from_secs(self.download_timeout_secs),
            &self.user_agent,
        )
        .context("failed to build HTTP client")
    }

    /// Repository store wired from this configuration.
    pub fn store(&self) -> Result<Store> {
        Ok(Store::new(self.layout(), Arc::new(self.fetcher()?)))
    }
}

/// Default location of the config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.json")
}

/// Write the default configuration file if none exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let serialized = serde_json::to_string_pretty(&AppConfig::default())
        .context("failed to serialize default configuration")?;
    fs::write(path, serialized).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(&dir.path().join("absent.json"))?;
        assert_eq!(config.info_filename, "info.json");
        assert_eq!(config.image_filename, "image.bin");
        assert_eq!(config.download_timeout_secs, 30);
        Ok(())
    }

    #[test]
    fn file_overrides_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "data_root": "/srv/decks", "download_timeout_secs": 5 }"#,
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.data_root, PathBuf::from("/srv/decks"));
        assert_eq!(config.download_timeout_secs, 5);
        assert_eq!(config.image_extension, "bin");
        assert_eq!(
            config.layout().deck_info("g", "c", "d"),
            PathBuf::from("/srv/decks/g/c/d.json")
        );
        Ok(())
    }

    #[test]
    fn default_file_is_written_once() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/config.json");
        write_default_config(&path)?;
        let written = fs::read_to_string(&path)?;
        assert!(written.contains("info_filename"));

        fs::write(&path, "{}")?;
        write_default_config(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "{}");
        Ok(())
    }
}
