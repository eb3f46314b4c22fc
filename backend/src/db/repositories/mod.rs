//! Repository implementations module.
//!
//! This module contains the implementations of the `RealflowRepository` trait:
//! - `mssql`: SQL Server implementation over tiberius with a bb8 pool
//! - `local`: In-memory implementation for unit testing and local development
pub mod local;
#[cfg(feature = "mssql-repo")]
pub mod mssql;

pub use local::LocalRepository;
#[cfg(feature = "mssql-repo")]
pub use mssql::MssqlRepository;
