//! Repository factory for dependency injection.
//!
//! This module provides utilities for creating and configuring repository instances
//! based on runtime configuration.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use log::info;

use super::config::DbConfig;
use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
#[cfg(feature = "mssql-repo")]
use super::repositories::MssqlRepository;
use super::repository::{RealflowRepository, RepositoryError, RepositoryResult};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// SQL Server via tiberius
    Mssql,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string ("mssql", "sqlserver", "local").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mssql" | "sqlserver" | "sql_server" => Ok(Self::Mssql),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment variable.
    ///
    /// Reads `REPOSITORY_TYPE`. Without it, defaults to SQL Server when
    /// `DB_SERVER` is set, otherwise Local.
    pub fn from_env() -> Result<Self, String> {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            if !val.trim().is_empty() {
                return val.parse();
            }
        }

        if std::env::var("DB_SERVER").is_ok() {
            Ok(Self::Mssql)
        } else {
            Ok(Self::Local)
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```ignore
/// use realflow_api::db::{DbConfig, RepositoryFactory, RepositoryType};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DbConfig::from_env()?;
///     let repo = RepositoryFactory::create(RepositoryType::Mssql, Some(&config)).await?;
///     let local = RepositoryFactory::create_local();
///     Ok(())
/// }
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// # Arguments
    /// * `repo_type` - Type of repository to create
    /// * `db_config` - Optional database configuration (required for SQL Server)
    pub async fn create(
        repo_type: RepositoryType,
        db_config: Option<&DbConfig>,
    ) -> RepositoryResult<Arc<dyn RealflowRepository>> {
        match repo_type {
            RepositoryType::Mssql => {
                let config = db_config.ok_or_else(|| {
                    RepositoryError::configuration("SQL Server repository requires DbConfig")
                })?;
                Self::create_mssql(config).await
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Create a SQL Server repository with its own connection pool.
    #[cfg(feature = "mssql-repo")]
    pub async fn create_mssql(config: &DbConfig) -> RepositoryResult<Arc<dyn RealflowRepository>> {
        info!("Connecting to {}", config.connection_string());
        let repo = MssqlRepository::connect(config.clone()).await?;
        Ok(Arc::new(repo))
    }

    #[cfg(not(feature = "mssql-repo"))]
    pub async fn create_mssql(_config: &DbConfig) -> RepositoryResult<Arc<dyn RealflowRepository>> {
        Err(RepositoryError::configuration(
            "SQL Server repository feature not enabled",
        ))
    }

    /// Create an empty in-memory local repository.
    pub fn create_local() -> Arc<dyn RealflowRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create a local repository seeded from a JSON file.
    pub fn create_local_seeded<P: AsRef<Path>>(
        seed_file: P,
    ) -> RepositoryResult<Arc<dyn RealflowRepository>> {
        let repo = LocalRepository::from_json_file(seed_file)?;
        info!("Local repository seeded with {} records", repo.len());
        Ok(Arc::new(repo))
    }

    /// Create repository from environment configuration.
    ///
    /// Uses `REPOSITORY_TYPE`, `DB_*` variables for SQL Server and
    /// `LOCAL_SEED_FILE` for the local backend.
    pub async fn from_env() -> RepositoryResult<Arc<dyn RealflowRepository>> {
        let repo_type = RepositoryType::from_env().map_err(RepositoryError::configuration)?;

        match repo_type {
            RepositoryType::Mssql => {
                let config = DbConfig::from_env().map_err(RepositoryError::configuration)?;
                Self::create_mssql(&config).await
            }
            RepositoryType::Local => match std::env::var("LOCAL_SEED_FILE") {
                Ok(path) if !path.trim().is_empty() => Self::create_local_seeded(path),
                _ => Ok(Self::create_local()),
            },
        }
    }

    /// Create repository from a TOML configuration file.
    pub async fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn RealflowRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config).await
    }

    /// Create repository from a RepositoryConfig instance.
    pub async fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn RealflowRepository>> {
        let repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        match repo_type {
            RepositoryType::Mssql => {
                let db_config = config.to_db_config()?.ok_or_else(|| {
                    RepositoryError::configuration(
                        "SQL Server repository requires database configuration",
                    )
                })?;
                Self::create_mssql(&db_config).await
            }
            RepositoryType::Local => match &config.repository.seed_file {
                Some(path) => Self::create_local_seeded(path),
                None => Ok(Self::create_local()),
            },
        }
    }
}
