//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TIFFIN_API_BASE_URL` - Base URL of the backend API
//!   (e.g., `http://127.0.0.1:8000`)
//!
//! ## Optional
//! - `TIFFIN_DEBUG` - Enable verbose client logging (default: false)
//! - `TIFFIN_DEFAULT_SEARCH_RADIUS_KM` - Radius for nearby search (default: 5)
//! - `TIFFIN_MAX_PAGE_SIZE` - Listing page size for popular/new (default: 20)
//! - `TIFFIN_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 10)

use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_SEARCH_RADIUS_KM: f64 = 5.0;
const DEFAULT_MAX_PAGE_SIZE: u32 = 20;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Tiffin client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend API.
    pub base_url: Url,
    /// Verbose client logging.
    pub debug: bool,
    /// Radius in kilometres for the nearby search.
    pub default_search_radius_km: f64,
    /// Page size for the popular/new listings.
    pub max_page_size: u32,
    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = parse_url("TIFFIN_API_BASE_URL", &get_required_env("TIFFIN_API_BASE_URL")?)?;
        let debug = get_optional_env("TIFFIN_DEBUG")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        let default_search_radius_km = match get_optional_env("TIFFIN_DEFAULT_SEARCH_RADIUS_KM") {
            Some(v) => parse_f64("TIFFIN_DEFAULT_SEARCH_RADIUS_KM", &v)?,
            None => DEFAULT_SEARCH_RADIUS_KM,
        };
        let max_page_size = match get_optional_env("TIFFIN_MAX_PAGE_SIZE") {
            Some(v) => parse_u32("TIFFIN_MAX_PAGE_SIZE", &v)?,
            None => DEFAULT_MAX_PAGE_SIZE,
        };
        let timeout_secs = match get_optional_env("TIFFIN_REQUEST_TIMEOUT_SECS") {
            Some(v) => parse_u64("TIFFIN_REQUEST_TIMEOUT_SECS", &v)?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url,
            debug,
            default_search_radius_km,
            max_page_size,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse a boolean flag. Anything other than "true"/"1" is false.
fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "true" | "1")
}

fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("yes"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_parse_url_valid() {
        let url = parse_url("TEST", "http://127.0.0.1:8000").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/");
    }

    #[test]
    fn test_parse_url_invalid() {
        let err = parse_url("TEST", "not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "TEST"));
    }

    #[test]
    fn test_parse_numbers() {
        assert!((parse_f64("TEST", "7.5").unwrap() - 7.5).abs() < f64::EPSILON);
        assert_eq!(parse_u32("TEST", "20").unwrap(), 20);
        assert_eq!(parse_u64("TEST", " 10 ").unwrap(), 10);
        assert!(parse_u32("TEST", "-1").is_err());
    }
}
