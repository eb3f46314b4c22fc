//! Database module for RealFlow feed access.
//!
//! This module provides abstractions for database operations via the Repository pattern,
//! allowing the SQL Server backend and the in-memory backend to be swapped easily.
//!
//! # Repository Pattern
//! The module includes:
//! - `services`: High-level operations used by the HTTP layer
//! - `repository`: Trait definition and error types
//! - `repositories::mssql`: SQL Server implementation (feature `mssql-repo`)
//! - `repositories::local`: In-memory implementation for unit testing and local development
//! - `factory`: Factory for creating repository instances
//! - `config` / `repo_config`: environment and TOML configuration
//!
//! # Recommended Usage
//!
//! ```ignore
//! use realflow_api::db::{services, RepositoryFactory};
//! use realflow_api::db::services::SortOrder;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::from_env().await?;
//!     let records = services::list_records(repo.as_ref(), SortOrder::Descending).await?;
//!     Ok(())
//! }
//! ```
//!
//! Repositories are handed around as `Arc<dyn RealflowRepository>`; each SQL
//! Server repository owns its connection pool, so there is no process-wide
//! connection state.

pub mod config;
pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

pub use config::{unmatched_policy_from_env, DbConfig, DEFAULT_COMID};
pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "mssql-repo")]
pub use repositories::MssqlRepository;
pub use repository::{ErrorContext, RealflowRepository, RepositoryError, RepositoryResult};
pub use services::{JobsSummary, SortOrder};
