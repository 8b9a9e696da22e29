//! Identity provider configuration.
//!
//! Configuration is deserialized from the environment by the server's
//! config layer and then validated here. Validation is fail-closed: every
//! missing or invalid variable is reported in one enumerated list instead
//! of failing on the first problem or proceeding partially configured.

use serde::Deserialize;
use std::fmt;

/// Default application base URL for local development.
fn default_app_url() -> String {
    "http://localhost:5000".to_string()
}

fn empty() -> String {
    String::new()
}

/// Configuration for the hosted identity provider.
///
/// Required: `provider_url` and `publishable_key`. The service role key is
/// only needed for privileged server-side operations and may be omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the identity provider (e.g. "https://xyz.example.co").
    #[serde(default = "empty")]
    provider_url: String,
    /// Publishable (anonymous) API key sent with every provider request.
    #[serde(default = "empty")]
    publishable_key: String,
    /// Optional service-role key for privileged operations.
    #[serde(default)]
    service_role_key: Option<String>,
    /// Public base URL of this application.
    #[serde(default = "default_app_url")]
    app_url: String,
}

impl IdentityConfig {
    /// Creates a configuration with the required fields and defaults for
    /// the rest.
    #[must_use]
    pub fn new(provider_url: String, publishable_key: String) -> Self {
        Self {
            provider_url,
            publishable_key,
            service_role_key: None,
            app_url: default_app_url(),
        }
    }

    /// Returns the provider base URL.
    #[must_use]
    pub fn provider_url(&self) -> &str {
        &self.provider_url
    }

    /// Returns the publishable API key.
    #[must_use]
    pub fn publishable_key(&self) -> &str {
        &self.publishable_key
    }

    /// Returns the service-role key, if configured.
    #[must_use]
    pub fn service_role_key(&self) -> Option<&str> {
        self.service_role_key.as_deref()
    }

    /// Returns the public base URL of this application.
    #[must_use]
    pub fn app_url(&self) -> &str {
        &self.app_url
    }

    /// Validates the configuration, collecting every problem found.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigValidationError` enumerating all missing or invalid
    /// settings. An empty error list never escapes this function.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let mut errors = Vec::new();

        if self.provider_url.is_empty() {
            errors.push("IDENTITY__PROVIDER_URL is missing".to_string());
        } else if !self.provider_url.starts_with("http://")
            && !self.provider_url.starts_with("https://")
        {
            errors.push(format!(
                "IDENTITY__PROVIDER_URL '{}' is not an http(s) URL",
                self.provider_url
            ));
        }

        if self.publishable_key.is_empty() {
            errors.push("IDENTITY__PUBLISHABLE_KEY is missing".to_string());
        }

        if self.app_url.is_empty() {
            errors.push("IDENTITY__APP_URL must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigValidationError { errors })
        }
    }

    /// Returns the provider's auth API base, without a trailing slash.
    #[must_use]
    pub fn auth_base(&self) -> String {
        format!("{}/auth/v1", self.provider_url.trim_end_matches('/'))
    }
}

/// Enumerated configuration problems, reported together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    errors: Vec<String>,
}

impl ConfigValidationError {
    /// Returns each individual validation failure.
    #[must_use]
    pub fn causes(&self) -> &[String] {
        &self.errors
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "identity configuration is invalid: {}",
            self.errors.join("; ")
        )
    }
}

impl std::error::Error for ConfigValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_config_passes() {
        let config = IdentityConfig::new(
            "https://id.example.com".to_string(),
            "pk_test_123".to_string(),
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_fields_are_all_enumerated() {
        let config = IdentityConfig::new(String::new(), String::new());
        let err = config.validate().expect_err("should fail");
        assert_eq!(err.causes().len(), 2);
        assert!(err.causes()[0].contains("PROVIDER_URL"));
        assert!(err.causes()[1].contains("PUBLISHABLE_KEY"));
    }

    #[test]
    fn non_http_url_is_rejected() {
        let config =
            IdentityConfig::new("ftp://id.example.com".to_string(), "pk".to_string());
        let err = config.validate().expect_err("should fail");
        assert_eq!(err.causes().len(), 1);
        assert!(err.causes()[0].contains("not an http(s) URL"));
    }

    #[test]
    fn app_url_defaults_for_local_development() {
        let config = IdentityConfig::new("https://id.example.com".to_string(), "pk".to_string());
        assert_eq!(config.app_url(), "http://localhost:5000");
    }

    #[test]
    fn auth_base_strips_trailing_slash() {
        let config =
            IdentityConfig::new("https://id.example.com/".to_string(), "pk".to_string());
        assert_eq!(config.auth_base(), "https://id.example.com/auth/v1");
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{
            "provider_url": "https://id.example.com",
            "publishable_key": "pk_live"
        }"#;
        let config: IdentityConfig = serde_json::from_str(json).expect("deserialize");
        assert_eq!(config.provider_url(), "https://id.example.com");
        assert!(config.service_role_key().is_none());
        assert_eq!(config.app_url(), "http://localhost:5000");
    }
}
