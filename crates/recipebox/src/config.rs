//! Configuration management for recipebox.
//!
//! Configuration is only read by whatever composes the application (the
//! `recipebox` binary). The repository itself takes a root path and image
//! settings and never looks at the environment.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "recipebox";

/// Application configuration.
///
/// Loaded from (highest precedence first):
/// 1. Environment variables prefixed with `RECIPEBOX_` (`__` separates sections)
/// 2. TOML config file at `~/.config/recipebox/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Image encoding configuration.
    pub images: ImageConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory holding the index, detail documents and images.
    /// Defaults to `~/.local/share/recipebox`.
    pub root: Option<PathBuf>,
}

/// Settings applied when an image is written to the asset store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// JPEG quality, 1 to 100.
    pub jpeg_quality: u8,
    /// Longest edge in pixels; larger photos are downscaled. 0 disables.
    pub max_dimension: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 80,
            max_dimension: 2048,
        }
    }
}

impl Config {
    /// Load configuration from defaults, the config file and `RECIPEBOX_*`
    /// environment variables, in that order of precedence.
    ///
    /// `None` reads the file at [`default_config_path`](Self::default_config_path);
    /// a missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("RECIPEBOX_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.images.jpeg_quality) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "jpeg_quality must be between 1 and 100, got {}",
                    self.images.jpeg_quality
                ),
            });
        }

        if let Some(root) = &self.storage.root {
            if root.as_os_str().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "storage root must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the storage root, resolving the default if not set.
    #[must_use]
    pub fn storage_root(&self) -> PathBuf {
        self.storage
            .root
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }
}
