//! Application configuration.

use serde::Deserialize;
use std::path::Path;
use url::Url;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Voting rules.
    #[serde(default)]
    pub voting: VotingConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (`sqlite://` or `postgres://`).
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Voting rules.
#[derive(Debug, Clone, Deserialize)]
pub struct VotingConfig {
    /// Reject ratings outside `[min_rating, max_rating]`.
    ///
    /// Off by default: any integer rating is stored as submitted.
    #[serde(default)]
    pub enforce_rating_range: bool,
    /// Lowest accepted rating when the range is enforced.
    #[serde(default = "default_min_rating")]
    pub min_rating: i32,
    /// Highest accepted rating when the range is enforced.
    #[serde(default = "default_max_rating")]
    pub max_rating: i32,
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Third-party identity providers accepted for sign-in.
    #[serde(default)]
    pub federated: Vec<FederatedProviderConfig>,
}

/// A third-party identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct FederatedProviderConfig {
    /// Provider name used in routes and stored on provisioned accounts (e.g. `google`).
    pub name: String,
    /// `OpenID` Connect user-info endpoint that accepts a bearer access token.
    pub userinfo_url: Url,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

fn default_database_url() -> String {
    "sqlite://dinner-rater.db?mode=rwc".to_string()
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_min_connections() -> u32 {
    1
}

const fn default_min_rating() -> i32 {
    1
}

const fn default_max_rating() -> i32 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
        }
    }
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            enforce_rating_range: false,
            min_rating: default_min_rating(),
            max_rating: default_max_rating(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `DINNER_ENV`)
    /// 3. Environment variables with `DINNER__` prefix (e.g. `DINNER__DATABASE__URL`)
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("DINNER_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DINNER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("DINNER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Find a federated identity provider by name.
    #[must_use]
    pub fn federated_provider(&self, name: &str) -> Option<&FederatedProviderConfig> {
        self.auth.federated.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = from_toml("");

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.url, "sqlite://dinner-rater.db?mode=rwc");
        assert!(!config.voting.enforce_rating_range);
        assert_eq!(config.voting.min_rating, 1);
        assert_eq!(config.voting.max_rating, 10);
        assert!(config.auth.federated.is_empty());
    }

    #[test]
    fn test_federated_providers() {
        let config = from_toml(
            r#"
            [voting]
            enforce_rating_range = true

            [[auth.federated]]
            name = "google"
            userinfo_url = "https://openidconnect.googleapis.com/v1/userinfo"
            "#,
        );

        assert!(config.voting.enforce_rating_range);
        let google = config.federated_provider("google").unwrap();
        assert_eq!(google.userinfo_url.host_str(), Some("openidconnect.googleapis.com"));
        assert!(config.federated_provider("github").is_none());
    }
}
