//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_PROFILE` - Widget profile, `simple` or `strict` (default: strict)
//! - `STOREFRONT_PAGE_TTL_SECS` - Idle seconds before a page's state is dropped (default: 1800)
//! - `STOREFRONT_MAX_PAGES` - Maximum number of live pages (default: 10000)
//! - `STOREFRONT_NOTICE_MS` - Banner display time in milliseconds (default: 3000)
//! - `STOREFRONT_RESET_BUTTON` - Render the registration reset button (default: true)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0 to 1.0 (default: 0.0)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use caprichos_core::{Profile, StoreConfig};
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Widget profile
    pub profile: Profile,
    /// How long an untouched page keeps its state
    pub page_ttl: Duration,
    /// Upper bound on live pages
    pub max_pages: u64,
    /// How long notices stay on screen
    pub notice_dismiss: Duration,
    /// Whether the registration form carries a reset button
    pub reset_button: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, staging)
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            profile: Profile::Strict,
            page_ttl: Duration::from_secs(1800),
            max_pages: 10_000,
            notice_dismiss: Duration::from_secs(3),
            reset_button: true,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to a value that does not
    /// parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` naming the first bad variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let page_ttl_secs: u64 = parse_or(&lookup, "STOREFRONT_PAGE_TTL_SECS", defaults.page_ttl.as_secs())?;
        if page_ttl_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_PAGE_TTL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let notice_ms: u64 = parse_or(&lookup, "STOREFRONT_NOTICE_MS", 3000)?;

        Ok(Self {
            host: parse_or(&lookup, "STOREFRONT_HOST", defaults.host)?,
            port: parse_or(&lookup, "STOREFRONT_PORT", defaults.port)?,
            profile: parse_or(&lookup, "STOREFRONT_PROFILE", defaults.profile)?,
            page_ttl: Duration::from_secs(page_ttl_secs),
            max_pages: parse_or(&lookup, "STOREFRONT_MAX_PAGES", defaults.max_pages)?,
            notice_dismiss: Duration::from_millis(notice_ms),
            reset_button: parse_or(&lookup, "STOREFRONT_RESET_BUTTON", defaults.reset_button)?,
            sentry_dsn: non_empty(lookup("SENTRY_DSN")),
            sentry_environment: non_empty(lookup("SENTRY_ENVIRONMENT")),
            sentry_sample_rate: parse_rate(&lookup, "SENTRY_SAMPLE_RATE", defaults.sentry_sample_rate)?,
            sentry_traces_sample_rate: parse_rate(
                &lookup,
                "SENTRY_TRACES_SAMPLE_RATE",
                defaults.sentry_traces_sample_rate,
            )?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Widget configuration for the selected profile.
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        let mut store = StoreConfig::for_profile(self.profile);
        store.notices.dismiss_after = self.notice_dismiss;
        store
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional variable, falling back to `default` when unset or blank.
fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup(key)) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Parse a sample rate and check it lies in `0.0..=1.0`.
fn parse_rate(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: f32,
) -> Result<f32, ConfigError> {
    let rate = parse_or(lookup, key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{rate} is outside 0.0..=1.0"),
        ))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use caprichos_core::config::PasswordPolicy;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.profile, Profile::Strict);
        assert_eq!(config.page_ttl, Duration::from_secs(1800));
        assert_eq!(config.max_pages, 10_000);
        assert!(config.reset_button);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOREFRONT_HOST", "0.0.0.0"),
            ("STOREFRONT_PORT", "8080"),
            ("STOREFRONT_PROFILE", "Simple"),
            ("STOREFRONT_NOTICE_MS", "1500"),
            ("STOREFRONT_RESET_BUTTON", "false"),
            ("SENTRY_DSN", "https://key@sentry.example.com/1"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.profile, Profile::Simple);
        assert!(!config.reset_button);
        assert_eq!(config.sentry_dsn.as_deref(), Some("https://key@sentry.example.com/1"));

        let store = config.store_config();
        assert_eq!(store.notices.dismiss_after, Duration::from_millis(1500));
        assert_eq!(store.gallery.max_images, None);
        assert_eq!(store.validation.password, PasswordPolicy::Length { min_length: 6 });
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = load(&[("STOREFRONT_PORT", "  "), ("SENTRY_DSN", "")]).unwrap();
        assert_eq!(config.port, 3000);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("STOREFRONT_PORT", "http"),
            ("STOREFRONT_HOST", "localhost"),
            ("STOREFRONT_PROFILE", "lenient"),
            ("STOREFRONT_PAGE_TTL_SECS", "0"),
            ("SENTRY_SAMPLE_RATE", "1.5"),
        ] {
            let err = load(&[(key, value)]).unwrap_err();
            assert!(
                matches!(&err, ConfigError::InvalidEnvVar(name, _) if name == key),
                "{key}={value} gave {err}"
            );
        }
    }
}
