//! Client configuration.
//!
//! Everything the components need is carried by an explicit `ClientConfig`
//! handed to them at construction; nothing is read from ambient state later.

use std::path::PathBuf;

use crate::db::CURRENT_VERSION;
use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

/// Default remote service location
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:1337";

/// Default store name
pub const DEFAULT_STORE_NAME: &str = "mws-restaurant-reviews";

pub const ENV_API_URL: &str = "TABLESYNC_API_URL";
pub const ENV_DB_PATH: &str = "TABLESYNC_DB_PATH";
pub const ENV_DB_VERSION: &str = "TABLESYNC_DB_VERSION";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the restaurant service, without trailing slash
    pub api_base_url: String,
    /// Local store file
    pub store_path: PathBuf,
    /// Version the store is opened (and upgraded) at
    pub store_version: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            store_path: default_store_path(),
            store_version: CURRENT_VERSION,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `TABLESYNC_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    ///
    /// Blank values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = normalize_text_option(lookup(ENV_API_URL)) {
            config = config.with_api_base_url(url)?;
        }
        if let Some(path) = normalize_text_option(lookup(ENV_DB_PATH)) {
            config.store_path = PathBuf::from(path);
        }
        if let Some(version) = normalize_text_option(lookup(ENV_DB_VERSION)) {
            let version = version.parse::<u32>().map_err(|_| {
                Error::Validation(format!("{ENV_DB_VERSION} must be a number, got '{version}'"))
            })?;
            config = config.with_store_version(version)?;
        }

        Ok(config)
    }

    /// Override the API base URL; it must use an http(s) scheme.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Result<Self> {
        let url = normalize_text_option(Some(url.into()))
            .ok_or_else(|| Error::Validation("API base URL must not be empty".to_string()))?;
        if !is_http_url(&url) {
            return Err(Error::Validation(format!(
                "API base URL must include http:// or https://: {url}"
            )));
        }
        self.api_base_url = url.trim_end_matches('/').to_string();
        Ok(self)
    }

    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    pub fn with_store_version(mut self, version: u32) -> Result<Self> {
        if version > CURRENT_VERSION {
            return Err(Error::Validation(format!(
                "store version {version} is newer than the supported version {CURRENT_VERSION}"
            )));
        }
        self.store_version = version;
        Ok(self)
    }
}

/// `<data dir>/tablesync/mws-restaurant-reviews.db`, or the working
/// directory when the platform has no data directory.
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("tablesync"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(format!("{DEFAULT_STORE_NAME}.db"))
}
