//! Configuration
//!
//! Where the backend lives and the limits the managers enforce. Loaded from
//! TOML, from `TASTEBOOK_*` environment variables, or baked in at build time
//! for the browser bundle.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted image upload
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;
/// How long a transient notice stays visible
pub const DEFAULT_NOTICE_TTL_MS: u64 = 3000;
pub const DEFAULT_IMAGE_BUCKET: &str = "recipe-images";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// Backend base URL; empty means run against the in-memory gateway
    pub api_url: String,
    /// Anonymous API key sent with every request
    pub api_key: String,
    pub image_bucket: String,
    pub max_upload_bytes: u64,
    pub notice_ttl_ms: u64,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            image_bucket: DEFAULT_IMAGE_BUCKET.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            notice_ttl_ms: DEFAULT_NOTICE_TTL_MS,
        }
    }
}

impl CmsConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: CmsConfig = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read `TASTEBOOK_API_URL`, `TASTEBOOK_API_KEY`, `TASTEBOOK_IMAGE_BUCKET`,
    /// `TASTEBOOK_MAX_UPLOAD_BYTES` and `TASTEBOOK_NOTICE_TTL_MS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CmsConfig::from_env`] with a custom variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = CmsConfig::default();
        if let Some(url) = lookup("TASTEBOOK_API_URL") {
            config.api_url = url;
        }
        if let Some(key) = lookup("TASTEBOOK_API_KEY") {
            config.api_key = key;
        }
        if let Some(bucket) = lookup("TASTEBOOK_IMAGE_BUCKET") {
            config.image_bucket = bucket;
        }
        if let Some(raw) = lookup("TASTEBOOK_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = parse_number("max_upload_bytes", &raw)?;
        }
        if let Some(raw) = lookup("TASTEBOOK_NOTICE_TTL_MS") {
            config.notice_ttl_ms = parse_number("notice_ttl_ms", &raw)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Values captured by `option_env!` when the bundle was compiled
    pub fn from_build_env() -> Self {
        let mut config = CmsConfig::default();
        if let Some(url) = option_env!("TASTEBOOK_API_URL") {
            config.api_url = url.to_string();
        }
        if let Some(key) = option_env!("TASTEBOOK_API_KEY") {
            config.api_key = key.to_string();
        }
        if let Some(bucket) = option_env!("TASTEBOOK_IMAGE_BUCKET") {
            config.image_bucket = bucket.to_string();
        }
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_bucket.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "image_bucket",
                message: "must not be empty".to_string(),
            });
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid {
                key: "max_upload_bytes",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.notice_ttl_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "notice_ttl_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// True when a real backend is configured
    pub fn has_backend(&self) -> bool {
        !self.api_url.trim().is_empty()
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }
}

fn parse_number(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        message: format!("expected a whole number, got {:?}", raw),
    })
}
