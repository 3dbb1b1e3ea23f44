//! Storefront configuration parsed from environment variables.
//!
//! Missing service credentials are not an error: they select the offline
//! backend so the storefront still runs without a live project.

use std::fmt;

pub const ENV_SERVICE_URL: &str = "SUPABASE_URL";
pub const ENV_SERVICE_KEY: &str = "SUPABASE_ANON_KEY";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "SUPABASE_REQUEST_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "SUPABASE_CONNECT_TIMEOUT_SECS";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be an http(s) URL, got '{value}'")]
    InvalidUrl { var: &'static str, value: String },
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Connection details for the hosted identity service.
#[derive(Clone, PartialEq, Eq)]
pub struct LiveBackend {
    /// Project URL without a trailing slash.
    pub url: String,
    /// Public (anon) API key.
    pub anon_key: String,
}

// Keep the key out of logs.
impl fmt::Debug for LiveBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveBackend")
            .field("url", &self.url)
            .field("anon_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendMode {
    Live(LiveBackend),
    /// No credentials configured; users are fabricated locally.
    Fake,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    pub backend: BackendMode,
    pub timeouts: HttpTimeouts,
}

impl StorefrontConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `SUPABASE_URL` and `SUPABASE_ANON_KEY`: both required for the live backend
    /// - `SUPABASE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `SUPABASE_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error when a value is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_values(
            env_non_empty(ENV_SERVICE_URL).as_deref(),
            env_non_empty(ENV_SERVICE_KEY).as_deref(),
            env_non_empty(ENV_REQUEST_TIMEOUT_SECS).as_deref(),
            env_non_empty(ENV_CONNECT_TIMEOUT_SECS).as_deref(),
        )
    }

    /// Build typed config from raw values.
    ///
    /// # Errors
    ///
    /// Returns an error when a value is present but malformed.
    pub fn from_values(
        url: Option<&str>,
        anon_key: Option<&str>,
        request_timeout: Option<&str>,
        connect_timeout: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let timeouts = HttpTimeouts {
            request_secs: parse_secs(ENV_REQUEST_TIMEOUT_SECS, request_timeout, DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_secs(ENV_CONNECT_TIMEOUT_SECS, connect_timeout, DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        let backend = match (url, anon_key) {
            (Some(url), Some(key)) => BackendMode::Live(LiveBackend { url: parse_url(url)?, anon_key: key.to_owned() }),
            _ => {
                tracing::warn!(
                    url_set = url.is_some(),
                    key_set = anon_key.is_some(),
                    "missing {ENV_SERVICE_URL}/{ENV_SERVICE_KEY}; authentication runs in offline mode"
                );
                BackendMode::Fake
            }
        };

        Ok(Self { backend, timeouts })
    }

    #[must_use]
    pub fn is_fake(&self) -> bool {
        matches!(self.backend, BackendMode::Fake)
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn parse_url(raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim().trim_end_matches('/');
    let has_host = ["https://", "http://"]
        .iter()
        .any(|scheme| url.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()));
    if !has_host {
        return Err(ConfigError::InvalidUrl { var: ENV_SERVICE_URL, value: raw.to_owned() });
    }
    Ok(url.to_owned())
}

fn parse_secs(var: &'static str, raw: Option<&str>, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => match value.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::InvalidNumber { var, value: value.to_owned() }),
        },
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
