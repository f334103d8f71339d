//! Configuration file parser for ~/.config/chirp/config.toml.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! All keys are defaulted so any subset can be specified.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::feed::DEFAULT_ENDPOINT;

/// Upper bound on the config file size before parsing.
const MAX_CONFIG_SIZE: u64 = 64 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config file too large: {0} bytes")]
    TooLarge(u64),

    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

/// Top-level application configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Search endpoint the query template is applied to.
    pub endpoint: String,

    /// Request deadline in seconds.
    pub timeout_secs: u64,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
            user_agent: concat!("chirp/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from the given path; a missing file yields the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, exceeds the
    /// size cap, or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let metadata = std::fs::metadata(path)?;
        if metadata.len() > MAX_CONFIG_SIZE {
            return Err(ConfigError::TooLarge(metadata.len()));
        }

        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads from `~/.config/chirp/config.toml`; unset `HOME` or a missing
    /// file yields the defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        match default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// The configured endpoint as a parsed URL.
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        Ok(Url::parse(&self.endpoint)?)
    }
}

fn default_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("chirp")
            .join("config.toml"),
    )
}
