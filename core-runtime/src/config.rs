//! # Core Configuration Module
//!
//! Provides configuration management for the session client.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the API endpoint, the storage policy and the host
//! bridges the client talks through. It validates eagerly so that a
//! misconfigured client fails at start-up rather than on the first request.
//!
//! ## Required Settings
//!
//! - `api_base_url` - Origin of the backend API (`http` or `https`)
//!
//! ## Bridges (with platform defaults)
//!
//! - `HttpClient` - HTTP operations (desktop default: reqwest)
//! - `KeyValueStore` - Persistent slots (desktop default: JSON file)
//! - `Clock` - Time source (default: system clock)
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults for
//! `HttpClient` and `KeyValueStore` are injected automatically if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .api_base_url("https://api.intransparency.example")
//!     .hardened(true)
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! Settings can also be seeded from the environment:
//!
//! ```ignore
//! use core_runtime::config::CoreConfigBuilder;
//!
//! // INTRANSPARENCY_API_URL=https://api.example INTRANSPARENCY_HARDENED=1
//! let config = CoreConfigBuilder::from_env()?.build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{Clock, HttpClient, KeyValueStore, SystemClock};
use chrono::Duration;
use std::path::PathBuf;
use std::sync::Arc;

/// Not a secret: it only keeps tokens from being readable at a glance.
pub const DEFAULT_OBFUSCATION_KEY: &str = "intransparency-obfuscation";

/// Route the host navigates to when the session cannot be recovered.
pub const DEFAULT_SIGN_IN_ROUTE: &str = "/auth/login";

/// Matches the lifetime of tokens minted by the backend.
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

pub const ENV_API_URL: &str = "INTRANSPARENCY_API_URL";
pub const ENV_OBFUSCATION_KEY: &str = "INTRANSPARENCY_OBFUSCATION_KEY";
pub const ENV_HARDENED: &str = "INTRANSPARENCY_HARDENED";
pub const ENV_TOKEN_TTL_SECS: &str = "INTRANSPARENCY_TOKEN_TTL_SECS";
pub const ENV_STORAGE_PATH: &str = "INTRANSPARENCY_STORAGE_PATH";

/// Where session material lives between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Obfuscated bundle in the local key-value store only.
    #[default]
    Local,
    /// Local bundle plus a server-managed cookie mirror, read first on load.
    CookieSynced,
}

/// Core configuration for the session client.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Backend origin without a trailing slash
    pub api_base_url: String,

    pub storage_mode: StorageMode,

    /// Key for the at-rest token obfuscation
    pub obfuscation_key: String,

    /// Lifetime assigned to freshly issued access tokens
    pub token_ttl: Duration,

    pub sign_in_route: String,

    /// Location of the desktop file store
    pub storage_path: PathBuf,

    pub http_client: Arc<dyn HttpClient>,

    pub key_value_store: Arc<dyn KeyValueStore>,

    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("api_base_url", &self.api_base_url)
            .field("storage_mode", &self.storage_mode)
            .field("obfuscation_key", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("sign_in_route", &self.sign_in_route)
            .field("storage_path", &self.storage_path)
            .field("http_client", &"HttpClient { ... }")
            .field("key_value_store", &"KeyValueStore { ... }")
            .field("clock", &"Clock { ... }")
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Joins an API path such as `/api/auth/refresh` onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }

    pub fn is_hardened(&self) -> bool {
        self.storage_mode == StorageMode::CookieSynced
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The base URL is an absolute `http`/`https` URL
    /// - The token lifetime is positive and can be added to the current time
    /// - The sign-in route is an absolute path
    /// - The storage path is not empty
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.api_base_url).map_err(|e| {
            Error::Config(format!(
                "API base URL '{}' is invalid: {}",
                self.api_base_url, e
            ))
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "API base URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        if self.token_ttl <= Duration::zero() {
            return Err(Error::Config(
                "Token TTL must be greater than zero".to_string(),
            ));
        }

        if self.clock.now().checked_add_signed(self.token_ttl).is_none() {
            return Err(Error::Config(format!(
                "Token TTL of {} seconds is out of range",
                self.token_ttl.num_seconds()
            )));
        }

        if !self.sign_in_route.starts_with('/') {
            return Err(Error::Config(format!(
                "Sign-in route must start with '/', got '{}'",
                self.sign_in_route
            )));
        }

        if self.storage_path.as_os_str().is_empty() {
            return Err(Error::Config("Storage path cannot be empty".to_string()));
        }

        Ok(())
    }
}

fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("intransparency")
        .join("storage.json")
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required to reach the API. \
                 Desktop: enable the 'desktop-shims' feature to use the default ReqwestHttpClient. \
                 Other hosts: inject an implementation with .http_client()."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn key_value_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "KeyValueStore".to_string(),
        message: "KeyValueStore implementation is required for session persistence. \
                 Desktop: enable the 'desktop-shims' feature to use the default FileKeyValueStore. \
                 Other hosts: inject an implementation with .key_value_store()."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::try_new()
        .map_err(|e| Error::Internal(format!("Failed to create default HttpClient: {}", e)))?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_key_value_store(storage_path: &std::path::Path) -> Result<Arc<dyn KeyValueStore>> {
    use bridge_desktop::FileKeyValueStore;

    Ok(Arc::new(FileKeyValueStore::new(storage_path)))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_key_value_store(_storage_path: &std::path::Path) -> Result<Arc<dyn KeyValueStore>> {
    Err(key_value_store_missing_error())
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::Config(format!(
            "{} must be a boolean flag, got '{}'",
            name, other
        ))),
    }
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Call [`build()`](CoreConfigBuilder::build) once every required setting is
/// present. Missing bridges are filled with platform defaults where the
/// `desktop-shims` feature allows it.
#[derive(Default)]
pub struct CoreConfigBuilder {
    api_base_url: Option<String>,
    storage_mode: StorageMode,
    obfuscation_key: Option<String>,
    token_ttl: Option<Duration>,
    sign_in_route: Option<String>,
    storage_path: Option<PathBuf>,
    http_client: Option<Arc<dyn HttpClient>>,
    key_value_store: Option<Arc<dyn KeyValueStore>>,
    clock: Option<Arc<dyn Clock>>,
}

impl CoreConfigBuilder {
    /// Seeds a builder from the process environment.
    ///
    /// Unset variables leave the corresponding setting at its default; set but
    /// malformed values are reported as [`Error::Config`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Seeds a builder from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            builder = builder.api_base_url(url);
        }

        if let Some(key) = lookup(ENV_OBFUSCATION_KEY) {
            builder = builder.obfuscation_key(key);
        }

        if let Some(flag) = lookup(ENV_HARDENED) {
            builder = builder.hardened(parse_flag(ENV_HARDENED, &flag)?);
        }

        if let Some(secs) = lookup(ENV_TOKEN_TTL_SECS) {
            let secs: i64 = secs.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_TOKEN_TTL_SECS, secs
                ))
            })?;
            let ttl = Duration::try_seconds(secs).ok_or_else(|| {
                Error::Config(format!(
                    "{} is out of range, got '{}'",
                    ENV_TOKEN_TTL_SECS, secs
                ))
            })?;
            builder = builder.token_ttl(ttl);
        }

        if let Some(path) = lookup(ENV_STORAGE_PATH) {
            builder = builder.storage_path(path);
        }

        Ok(builder)
    }

    /// Sets the backend origin, e.g. `https://api.example.com`.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn storage_mode(mut self, mode: StorageMode) -> Self {
        self.storage_mode = mode;
        self
    }

    /// Selects [`StorageMode::CookieSynced`] when `true`, [`StorageMode::Local`] otherwise.
    pub fn hardened(self, enabled: bool) -> Self {
        self.storage_mode(if enabled {
            StorageMode::CookieSynced
        } else {
            StorageMode::Local
        })
    }

    /// Overrides the at-rest obfuscation key.
    ///
    /// The key is not a secret and offers no confidentiality. An empty key
    /// disables the XOR step, leaving plain base64.
    pub fn obfuscation_key(mut self, key: impl Into<String>) -> Self {
        self.obfuscation_key = Some(key.into());
        self
    }

    /// Default: 7 days
    pub fn token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = Some(ttl);
        self
    }

    /// Default: `/auth/login`
    pub fn sign_in_route(mut self, route: impl Into<String>) -> Self {
        self.sign_in_route = Some(route.into());
        self
    }

    /// Sets where the default file store persists its slots.
    ///
    /// Ignored when a [`KeyValueStore`] is injected explicitly.
    pub fn storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn key_value_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.key_value_store = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - The API base URL is missing or invalid
    /// - A bridge is missing and no platform default is available
    /// - Any other value fails [`CoreConfig::validate`]
    pub fn build(self) -> Result<CoreConfig> {
        let api_base_url = self
            .api_base_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "API base URL is required. Use .api_base_url() or set {}.",
                    ENV_API_URL
                ))
            })?;

        let storage_path = self.storage_path.unwrap_or_else(default_storage_path);

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let key_value_store = match self.key_value_store {
            Some(store) => store,
            None => provide_default_key_value_store(&storage_path)?,
        };

        let config = CoreConfig {
            api_base_url,
            storage_mode: self.storage_mode,
            obfuscation_key: self
                .obfuscation_key
                .unwrap_or_else(|| DEFAULT_OBFUSCATION_KEY.to_string()),
            token_ttl: self
                .token_ttl
                .unwrap_or_else(|| Duration::days(DEFAULT_TOKEN_TTL_DAYS)),
            sign_in_route: self
                .sign_in_route
                .unwrap_or_else(|| DEFAULT_SIGN_IN_ROUTE.to_string()),
            storage_path,
            http_client,
            key_value_store,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        };

        config.validate()?;

        Ok(config)
    }
}
