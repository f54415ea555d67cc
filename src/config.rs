use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub auth: AuthConfig,

    #[serde(default)]
    pub client: ClientConfig,
}

/// RadioReference account credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    pub username: String,

    pub password: String,

    #[serde(default = "default_app_key")]
    pub app_key: String,

    #[serde(default = "default_version")]
    pub version: String,
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_app_key() -> String {
    "88969092".to_string()
}

fn default_version() -> String {
    "latest".to_string()
}

fn default_endpoint() -> String {
    "https://api.radioreference.com/api".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| Error::Persistence { path: path.to_path_buf(), source })?;
        let config: Config = toml::from_str(&content)
            .map_err(|source| Error::Config { path: path.to_path_buf(), source })?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [auth]
            username = "w4abc"
            password = "hunter2"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.username, "w4abc");
        assert_eq!(config.auth.app_key, "88969092");
        assert_eq!(config.auth.version, "latest");
        assert_eq!(config.client.timeout_secs, 60);
        assert!(config.client.endpoint.starts_with("https://"));
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let config: Config = toml::from_str(
            r#"
            [auth]
            username = "w4abc"
            password = "hunter2"
            app_key = "12345678"

            [client]
            endpoint = "http://localhost:8080/api"
            timeout_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.app_key, "12345678");
        assert_eq!(config.client.endpoint, "http://localhost:8080/api");
        assert_eq!(config.client.timeout_secs, 5);
    }

    #[test]
    fn test_missing_credentials_fail() {
        assert!(toml::from_str::<Config>("[auth]\nusername = \"w4abc\"\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[auth]\nusername = \"w4abc\"\npassword = \"hunter2\"\n")
            .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.auth.password, "hunter2");

        match Config::from_file(&temp.path().join("absent.toml")) {
            Err(Error::Persistence { .. }) => {}
            other => panic!("expected persistence error, got {other:?}"),
        }

        std::fs::write(&path, "not toml at all [").unwrap();
        match Config::from_file(&path) {
            Err(Error::Config { .. }) => {}
            other => panic!("expected config error, got {other:?}"),
        }
    }
}
