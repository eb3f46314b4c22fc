//! Repository configuration file support.
//!
//! This module provides utilities for reading repository configuration from
//! TOML configuration files.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::config::{DbConfig, DEFAULT_COMID};
use super::factory::RepositoryType;
use super::repository::RepositoryError;
use crate::services::UnmatchedPolicy;

/// Repository configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub mssql: MssqlSettings,
    #[serde(default)]
    pub reconciler: ReconcilerSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
    /// JSON file used to seed the local backend.
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

/// SQL Server connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MssqlSettings {
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub encrypt: bool,
    #[serde(default = "default_true")]
    pub trust_cert: bool,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub min_connections: u32,
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    #[serde(default = "default_comid")]
    pub comid: i32,
}

/// Reconciliation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcilerSettings {
    #[serde(default)]
    pub unmatched: UnmatchedPolicy,
}

fn default_port() -> u16 {
    1433
}

fn default_true() -> bool {
    true
}

fn default_max_connections() -> u32 {
    10
}

fn default_idle_timeout_ms() -> u64 {
    30_000
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_comid() -> i32 {
    DEFAULT_COMID
}

impl RepositoryConfig {
    /// Load repository configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(RepositoryConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse repository configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, RepositoryError> {
        toml::from_str(content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }

    /// Convert to a [`DbConfig`] if this is a SQL Server configuration.
    pub fn to_db_config(&self) -> Result<Option<DbConfig>, RepositoryError> {
        let repo_type = self.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        if repo_type != RepositoryType::Mssql {
            return Ok(None);
        }

        let s = &self.mssql;
        let missing: Vec<&str> = [
            ("mssql.server", &s.server),
            ("mssql.database", &s.database),
            ("mssql.username", &s.username),
            ("mssql.password", &s.password),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| key)
        .collect();

        if !missing.is_empty() {
            return Err(RepositoryError::configuration(format!(
                "SQL Server repository requires settings: {}",
                missing.join(", ")
            )));
        }

        Ok(Some(DbConfig {
            port: s.port,
            encrypt: s.encrypt,
            trust_cert: s.trust_cert,
            pool_max: s.max_connections,
            pool_min: s.min_connections,
            idle_timeout_ms: s.idle_timeout_ms,
            connect_timeout_sec: s.connect_timeout,
            comid: s.comid,
            ..DbConfig::new(&s.server, &s.database, &s.username, &s.password)
        }))
    }
}
