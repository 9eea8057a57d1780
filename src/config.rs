//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_DEVICE_NAME: &str = "browser";
pub const DEFAULT_HOME_PATH: &str = "/";
pub const DEFAULT_STORAGE_PATH: &str = ".canteen/storage.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API base URL '{0}' (expected http:// or https://)")]
    InvalidBaseUrl(String),
    #[error("invalid value for {key}: {value}")]
    InvalidNumber { key: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for ApiTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the canteen backend, without a trailing slash.
    pub api_base_url: String,
    /// Sent as `device_name` with every login request.
    pub device_name: String,
    /// Where the navigator is sent after logout or a revoked session.
    pub home_path: String,
    /// File backing the persisted key-value store.
    pub storage_path: PathBuf,
    pub timeouts: ApiTimeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            device_name: DEFAULT_DEVICE_NAME.to_owned(),
            home_path: DEFAULT_HOME_PATH.to_owned(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            timeouts: ApiTimeouts::default(),
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `CANTEEN_API_BASE_URL`: default `http://127.0.0.1:8000/api`
    /// - `CANTEEN_DEVICE_NAME`: default `browser`
    /// - `CANTEEN_HOME_PATH`: default `/`
    /// - `CANTEEN_STORAGE_PATH`: default `.canteen/storage.json`
    /// - `CANTEEN_REQUEST_TIMEOUT_SECS`: default 30
    /// - `CANTEEN_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the base URL is not http(s) or a timeout
    /// is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = parse_base_url(
            std::env::var("CANTEEN_API_BASE_URL")
                .ok()
                .as_deref()
                .unwrap_or(DEFAULT_API_BASE_URL),
        )?;
        let device_name = env_non_empty("CANTEEN_DEVICE_NAME").unwrap_or_else(|| DEFAULT_DEVICE_NAME.to_owned());
        let home_path = env_non_empty("CANTEEN_HOME_PATH").unwrap_or_else(|| DEFAULT_HOME_PATH.to_owned());
        let storage_path = env_non_empty("CANTEEN_STORAGE_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from);
        let timeouts = ApiTimeouts {
            request_secs: env_parse_secs("CANTEEN_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse_secs("CANTEEN_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self { api_base_url, device_name, home_path, storage_path, timeouts })
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn env_parse_secs(key: &str, default: u64) -> Result<u64, ConfigError> {
    let Some(raw) = env_non_empty(key) else {
        return Ok(default);
    };
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidNumber { key: key.to_owned(), value: raw }),
    }
}

/// Validate an http(s) base URL and strip trailing slashes.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBaseUrl`] for any other scheme.
pub fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Err(ConfigError::InvalidBaseUrl(raw.to_owned()))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
