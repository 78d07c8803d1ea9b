// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! OSM Connection Configuration
//!
//! YAML document holding what the NBI client needs to reach OSM:
//!
//! ```yaml
//! hostname: osm.example.org:80
//! user: admin
//! password: admin
//! project: admin          # optional, defaults to "admin"
//! secure: false           # optional, defaults to false
//! requestTimeout: 10m     # optional, humantime syntax
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::connection::{AddressError, Connection, HostAndPort};
use super::credentials::UserCredentials;

/// Overall per-request timeout. OSM can be slow to process package uploads.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

const DEFAULT_PROJECT: &str = "admin";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid OSM address: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("failed to parse OSM connection config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("failed to read OSM connection config: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsmConnectionConfig {
    /// NBI address in the form `host:port`.
    pub hostname: String,

    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_project")]
    pub project: String,

    /// Use HTTPS instead of plain HTTP.
    #[serde(default)]
    pub secure: bool,

    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,
}

fn default_project() -> String {
    DEFAULT_PROJECT.to_string()
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

impl OsmConnectionConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Hostname must be a valid `host:port`; user must not be empty. There
    /// are no restrictions on the password.
    pub fn validate(&self) -> Result<(), ConfigError> {
        HostAndPort::parse(&self.hostname)?;
        if self.user.trim().is_empty() {
            return Err(ConfigError::MissingField("user"));
        }
        Ok(())
    }

    pub fn connection(&self) -> Result<Connection, ConfigError> {
        let address = HostAndPort::parse(&self.hostname)?;
        Ok(Connection::new(address, self.secure))
    }

    pub fn credentials(&self) -> UserCredentials {
        UserCredentials::new(&self.user, &self.password, &self.project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = OsmConnectionConfig::from_yaml_str(
            "hostname: localhost:8008\nuser: admin\npassword: secret\n",
        )
        .unwrap();

        assert_eq!(config.project, "admin");
        assert!(!config.secure);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);

        let conn = config.connection().unwrap();
        assert_eq!(conn.tokens().as_str(), "http://localhost:8008/osm/admin/v1/tokens");
        assert_eq!(config.credentials().password, "secret");
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
hostname: "[::1]:443"
user: bob
password: pass
project: nfv
secure: true
requestTimeout: 90s
"#;
        let config = OsmConnectionConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.project, "nfv");
        assert_eq!(config.request_timeout, Duration::from_secs(90));
        assert!(config.connection().unwrap().is_secure());
    }

    #[test]
    fn test_reject_bad_hostname() {
        let result = OsmConnectionConfig::from_yaml_str("hostname: localhost\nuser: admin\n");
        assert!(matches!(result, Err(ConfigError::InvalidAddress(_))));
    }

    #[test]
    fn test_reject_empty_user() {
        let result = OsmConnectionConfig::from_yaml_str("hostname: h:1\nuser: ''\n");
        assert!(matches!(result, Err(ConfigError::MissingField("user"))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("osm_creds.yaml");
        std::fs::write(&path, "hostname: osm:80\nuser: admin\n").unwrap();

        let config = OsmConnectionConfig::load(&path).unwrap();
        assert_eq!(config.hostname, "osm:80");
        assert_eq!(config.password, "");

        assert!(matches!(
            OsmConnectionConfig::load(dir.path().join("missing.yaml")),
            Err(ConfigError::Io(_))
        ));
    }
}
