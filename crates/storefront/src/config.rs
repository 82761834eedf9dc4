//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BAZAAR_CATALOG_URL` - Base URL of the product catalog API (default: `https://fakestoreapi.com`)
//! - `BAZAAR_STOREFRONT_URL` - Public storefront address used for shareable links (default: `http://localhost:3000`)
//! - `BAZAAR_DATA_DIR` - Directory holding the durable cart, wishlist and user keys (default: `.bazaar`)
//! - `BAZAAR_HTTP_TIMEOUT_SECS` - Catalog request timeout in seconds (default: none)
//! - `BAZAAR_PAGE_SIZE` - Products per listing page (default: 9)
//! - `BAZAAR_LOGIN_DELAY_MS` - Simulated login latency in milliseconds (default: 1000)
//! - `BAZAAR_LOG_FORMAT` - `pretty` or `json` (default: `pretty`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Public catalog used when `BAZAAR_CATALOG_URL` is unset.
pub const DEFAULT_CATALOG_URL: &str = "https://fakestoreapi.com";

/// Storefront address used when `BAZAAR_STOREFRONT_URL` is unset.
pub const DEFAULT_STOREFRONT_URL: &str = "http://localhost:3000";

const DEFAULT_DATA_DIR: &str = ".bazaar";
const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(9) {
    Some(size) => size,
    None => NonZeroUsize::MIN,
};
const DEFAULT_LOGIN_DELAY_MS: u64 = 1000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `pretty` or `json`, got `{other}`")),
        }
    }
}

/// Storefront application configuration.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Catalog API base URL, always ending in `/`
    pub catalog_url: Url,
    /// Storefront address that listing links point at
    pub storefront_url: Url,
    /// Directory for durable keys
    pub data_dir: PathBuf,
    /// Per-request timeout for catalog calls
    pub http_timeout: Option<Duration>,
    /// Products per listing page
    pub page_size: NonZeroUsize,
    /// Artificial latency of the simulated login
    pub login_delay: Duration,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("catalog_url", &self.catalog_url.as_str())
            .field("storefront_url", &self.storefront_url.as_str())
            .field("data_dir", &self.data_dir)
            .field("http_timeout", &self.http_timeout)
            .field("page_size", &self.page_size)
            .field("login_delay", &self.login_delay)
            .field("log_format", &self.log_format)
            .field(
                "sentry_dsn",
                &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"),
            )
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl StorefrontConfig {
    /// Create a configuration for `catalog_url` and `data_dir` with every
    /// other setting at its default.
    #[must_use]
    pub fn new(catalog_url: Url, data_dir: impl Into<PathBuf>) -> Self {
        let storefront_url =
            normalize_base_url(DEFAULT_STOREFRONT_URL).unwrap_or_else(|_| catalog_url.clone());
        Self {
            catalog_url,
            storefront_url,
            data_dir: data_dir.into(),
            http_timeout: None,
            page_size: DEFAULT_PAGE_SIZE,
            login_delay: Duration::from_millis(DEFAULT_LOGIN_DELAY_MS),
            log_format: LogFormat::Pretty,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let catalog_url = normalize_base_url(&get_env_or_default(
            "BAZAAR_CATALOG_URL",
            DEFAULT_CATALOG_URL,
        ))
        .map_err(|e| ConfigError::InvalidEnvVar("BAZAAR_CATALOG_URL".to_string(), e))?;

        let storefront_url = normalize_base_url(&get_env_or_default(
            "BAZAAR_STOREFRONT_URL",
            DEFAULT_STOREFRONT_URL,
        ))
        .map_err(|e| ConfigError::InvalidEnvVar("BAZAAR_STOREFRONT_URL".to_string(), e))?;

        let data_dir = PathBuf::from(get_env_or_default("BAZAAR_DATA_DIR", DEFAULT_DATA_DIR));

        let http_timeout = get_optional_env("BAZAAR_HTTP_TIMEOUT_SECS")
            .map(|raw| parse_env::<u64>("BAZAAR_HTTP_TIMEOUT_SECS", &raw))
            .transpose()?
            .map(Duration::from_secs);

        let page_size = parse_env::<NonZeroUsize>(
            "BAZAAR_PAGE_SIZE",
            &get_env_or_default("BAZAAR_PAGE_SIZE", &DEFAULT_PAGE_SIZE.get().to_string()),
        )?;

        let login_delay = Duration::from_millis(parse_env::<u64>(
            "BAZAAR_LOGIN_DELAY_MS",
            &get_env_or_default("BAZAAR_LOGIN_DELAY_MS", &DEFAULT_LOGIN_DELAY_MS.to_string()),
        )?);

        let log_format = get_optional_env("BAZAAR_LOG_FORMAT")
            .map(|raw| {
                raw.parse::<LogFormat>()
                    .map_err(|e| ConfigError::InvalidEnvVar("BAZAAR_LOG_FORMAT".to_string(), e))
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            catalog_url,
            storefront_url,
            data_dir,
            http_timeout,
            page_size,
            login_delay,
            log_format,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a catalog base URL and make sure relative joins keep its path.
///
/// # Errors
///
/// Returns a description of the problem if the URL is not absolute `http(s)`.
pub fn normalize_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
