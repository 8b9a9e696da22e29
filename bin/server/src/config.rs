//! Centralized server configuration.
//!
//! Loaded via the `config` crate from environment variables with a `__`
//! separator (e.g. `IDENTITY__PROVIDER_URL`). Loading and validation are
//! separate steps so that validation can report every problem at once:
//! a misconfigured deployment fails at startup with the complete list of
//! missing or invalid variables, never with the first one found.

use serde::Deserialize;
use std::fmt;
use studysync_identity::IdentityConfig;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// PostgreSQL connection URL.
    #[serde(default)]
    pub database_url: String,

    /// Address the HTTP server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Identity provider configuration.
    #[serde(default = "unconfigured_identity")]
    pub identity: IdentityConfig,

    /// Cookie configuration.
    #[serde(default)]
    pub cookies: CookieConfig,
}

/// Cookie-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CookieConfig {
    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: default_secure_cookies(),
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_secure_cookies() -> bool {
    true
}

/// Placeholder identity config used when no `IDENTITY__*` variables are
/// set, so that `validate` can enumerate the missing ones instead of the
/// deserializer failing with a single opaque error.
fn unconfigured_identity() -> IdentityConfig {
    IdentityConfig::new(String::new(), String::new())
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment cannot be parsed into the
    /// configuration shape. Missing values are not an error here; they are
    /// caught by [`validate`](Self::validate).
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Validates the configuration, collecting every problem found.
    ///
    /// # Errors
    ///
    /// Returns a `ServerConfigError` enumerating all missing or invalid
    /// settings across the server and identity sections.
    pub fn validate(&self) -> Result<(), ServerConfigError> {
        let mut errors = Vec::new();

        if self.database_url.is_empty() {
            errors.push("DATABASE_URL is missing".to_string());
        }
        if self.listen_addr.is_empty() {
            errors.push("LISTEN_ADDR must not be empty".to_string());
        }
        if let Err(identity) = self.identity.validate() {
            errors.extend(identity.causes().iter().cloned());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ServerConfigError { errors })
        }
    }
}

/// Enumerated configuration problems, reported together at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfigError {
    errors: Vec<String>,
}

impl ServerConfigError {
    /// Returns each individual validation failure.
    #[must_use]
    pub fn causes(&self) -> &[String] {
        &self.errors
    }
}

impl fmt::Display for ServerConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "server configuration is invalid: {}",
            self.errors.join("; ")
        )
    }
}

impl std::error::Error for ServerConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_valid() -> ServerConfig {
        ServerConfig {
            database_url: "postgres://localhost/studysync".to_string(),
            listen_addr: default_listen_addr(),
            identity: IdentityConfig::new(
                "https://id.example.com".to_string(),
                "pk_test".to_string(),
            ),
            cookies: CookieConfig::default(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(minimal_valid().validate().is_ok());
    }

    #[test]
    fn empty_config_enumerates_all_problems() {
        let config = ServerConfig {
            database_url: String::new(),
            listen_addr: default_listen_addr(),
            identity: unconfigured_identity(),
            cookies: CookieConfig::default(),
        };
        let err = config.validate().expect_err("should fail");
        assert!(err.causes().iter().any(|c| c.contains("DATABASE_URL")));
        assert!(err.causes().iter().any(|c| c.contains("PROVIDER_URL")));
        assert!(err.causes().iter().any(|c| c.contains("PUBLISHABLE_KEY")));
        assert!(err.causes().len() >= 3);
    }

    #[test]
    fn identity_problems_surface_through_server_validation() {
        let mut config = minimal_valid();
        config.identity = IdentityConfig::new(
            "not-a-url".to_string(),
            "pk_test".to_string(),
        );
        let err = config.validate().expect_err("should fail");
        assert_eq!(err.causes().len(), 1);
        assert!(err.causes()[0].contains("not an http(s) URL"));
    }

    #[test]
    fn cookies_default_to_secure() {
        assert!(CookieConfig::default().secure);
    }
}
