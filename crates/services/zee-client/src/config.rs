use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::ZeeError;

/// Default Zee backend base URL
pub const ZEE_DEFAULT_BASE: &str = "http://localhost:8080";
/// Header name for API key authentication
pub const HDR_X_API_KEY: &str = "x-api-key";
/// Environment variable overriding the base URL
pub const ENV_API_URL: &str = "ZEE_API_URL";
/// Environment variable holding the optional API key
pub const ENV_API_KEY: &str = "ZEE_API_KEY";
/// Default timeout for plain (non-streaming) REST requests
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the Zee client
///
/// Debug output automatically redacts `api_key` via [`SecretString`].
#[derive(Clone, Debug)]
pub struct ZeeConfig {
    api_base: String,
    api_key: Option<SecretString>,
    request_timeout: Duration,
}

fn env_trimmed(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Default for ZeeConfig {
    fn default() -> Self {
        Self {
            api_base: env_trimmed(ENV_API_URL).unwrap_or_else(|| ZEE_DEFAULT_BASE.into()),
            api_key: env_trimmed(ENV_API_KEY).map(SecretString::from),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ZeeConfig {
    /// Creates a new configuration with default settings
    ///
    /// Attempts to read from environment variables:
    /// - `ZEE_API_URL` for the backend base URL (defaults to `http://localhost:8080`)
    /// - `ZEE_API_KEY` for the optional `X-API-Key` header
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API base URL
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Sets the API key
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Sets the timeout applied to non-streaming requests
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Returns the configured API base URL
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

/// Configuration trait for the Zee client
///
/// Implement this trait to point the client at a differently-shaped deployment
/// (extra headers, path prefixes, and so on).
pub trait Config: Send + Sync {
    /// Returns HTTP headers to include in requests
    ///
    /// # Errors
    ///
    /// Returns an error if header values contain invalid characters.
    fn headers(&self) -> Result<HeaderMap, ZeeError>;

    /// Constructs the full URL for an API endpoint
    fn url(&self, path: &str) -> String;

    /// Timeout for requests that are not streams
    fn request_timeout(&self) -> Duration;

    /// Validates the configuration before any request is issued.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is unusable.
    fn validate(&self) -> Result<(), ZeeError>;
}

impl Config for ZeeConfig {
    fn headers(&self) -> Result<HeaderMap, ZeeError> {
        let mut h = HeaderMap::new();

        if let Some(secret) = &self.api_key {
            let key = secret.expose_secret().trim();
            if !key.is_empty() {
                h.insert(
                    HDR_X_API_KEY,
                    HeaderValue::from_str(key)
                        .map_err(|_| ZeeError::Config("Invalid x-api-key value".into()))?,
                );
            }
        }

        Ok(h)
    }

    fn url(&self, path: &str) -> String {
        let base = self.api_base.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    fn validate(&self) -> Result<(), ZeeError> {
        let parsed = url::Url::parse(&self.api_base)
            .map_err(|e| ZeeError::Config(format!("Invalid base URL {:?}: {e}", self.api_base)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ZeeError::Config(format!(
                "Unsupported URL scheme {other:?}: set {ENV_API_URL} to an http(s) address"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::EnvGuard;
    use serial_test::serial;

    #[test]
    #[serial(env)]
    fn config_reads_env_vars() {
        let _url = EnvGuard::set(ENV_API_URL, "http://zee.lan:9000");
        let _key = EnvGuard::set(ENV_API_KEY, "test-key-123");

        let cfg = ZeeConfig::new();
        assert_eq!(cfg.api_base(), "http://zee.lan:9000");

        let h = cfg.headers().unwrap();
        assert_eq!(
            h.get(HDR_X_API_KEY).unwrap().to_str().unwrap(),
            "test-key-123"
        );
    }

    #[test]
    #[serial(env)]
    fn config_defaults_to_loopback() {
        let _url = EnvGuard::remove(ENV_API_URL);
        let _key = EnvGuard::remove(ENV_API_KEY);

        let cfg = ZeeConfig::new();
        assert_eq!(cfg.api_base(), ZEE_DEFAULT_BASE);
        assert!(cfg.headers().unwrap().is_empty());
        assert_eq!(cfg.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    #[serial(env)]
    fn config_ignores_blank_env_values() {
        let _url = EnvGuard::set(ENV_API_URL, "   ");
        let _key = EnvGuard::set(ENV_API_KEY, "\n");

        let cfg = ZeeConfig::new();
        assert_eq!(cfg.api_base(), ZEE_DEFAULT_BASE);
        assert!(cfg.headers().unwrap().get(HDR_X_API_KEY).is_none());
    }

    #[test]
    fn url_joins_without_double_slashes() {
        let cfg = ZeeConfig::new().with_api_base("http://localhost:8080/");
        assert_eq!(cfg.url("/api/models"), "http://localhost:8080/api/models");
        assert_eq!(cfg.url("api/chat"), "http://localhost:8080/api/chat");
    }

    #[test]
    fn validate_rejects_bad_urls() {
        assert!(ZeeConfig::new().with_api_base("not a url").validate().is_err());
        assert!(
            ZeeConfig::new()
                .with_api_base("ftp://localhost")
                .validate()
                .is_err()
        );
        assert!(
            ZeeConfig::new()
                .with_api_base("https://chat.example.com")
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let cfg = ZeeConfig::new().with_api_key("super-secret-key-12345");
        let debug_str = format!("{cfg:?}");

        assert!(
            !debug_str.contains("super-secret-key-12345"),
            "Debug output should not contain the API key"
        );
        assert!(
            debug_str.contains("[REDACTED]"),
            "Debug output should contain '[REDACTED]', got: {debug_str}"
        );
    }
}
