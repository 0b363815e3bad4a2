//! Run configuration.
//!
//! Loaded from an optional TOML file; every section falls back to defaults,
//! and command-line flags are applied on top by the caller.

use crate::constants::{
    DEFAULT_KINDS, DEFAULT_OUTPUT_DIR, DEFAULT_QUALITY, DEFAULT_SHRINK_ENDPOINT, MAX_QUALITY,
    MIN_QUALITY,
};
use crate::error::{Result, SqueezeError};
use crate::filter::FilterConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Kind identifiers to process, in order
    pub kinds: Vec<String>,
    pub filter: FilterConfig,
    pub compression: CompressionConfig,
    pub service: ServiceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kinds: DEFAULT_KINDS.iter().map(|k| k.to_string()).collect(),
            filter: FilterConfig::default(),
            compression: CompressionConfig::default(),
            service: ServiceConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    pub enabled: bool,
    /// 1..=100
    pub quality: u8,
    pub keep_original: bool,
    /// Upload results to the secondary store. Accepted but not performed.
    pub auto_upload: bool,
    pub output_dir: PathBuf,
    pub remote: RemoteStoreConfig,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            quality: DEFAULT_QUALITY,
            keep_original: true,
            auto_upload: false,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            remote: RemoteStoreConfig::default(),
        }
    }
}

/// Secondary upload target. Configuration surface only; nothing reads it yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteStoreConfig {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub address: Option<String>,
    pub account: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SHRINK_ENDPOINT.to_string(),
            api_key: None,
        }
    }
}

impl Config {
    /// Reads `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SqueezeError::from_io(path, e))?;
        Ok(toml::from_str(&content)?)
    }

    /// Checks the final configuration, after command-line overrides are applied.
    ///
    /// An API key is required only when `compression.enabled` is set.
    pub fn validate(&self) -> Result<()> {
        let quality = self.compression.quality;
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(SqueezeError::InvalidQuality(quality));
        }
        if self.kinds.is_empty() {
            return Err(SqueezeError::Config("no file kinds selected".to_string()));
        }
        if self.compression.enabled && self.api_key().is_none() {
            return Err(SqueezeError::Config(
                "compression requires an API key (--api-key or TINIFY_API_KEY)".to_string(),
            ));
        }
        Ok(())
    }

    /// Non-empty API key, if one was configured.
    pub fn api_key(&self) -> Option<&str> {
        self.service.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}
