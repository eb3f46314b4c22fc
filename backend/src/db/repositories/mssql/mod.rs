//! SQL Server repository backed by tiberius and a bb8 connection pool.
//!
//! - `pool`: tiberius configuration and pool construction
//! - `operations`: SQL text and row decoding
//! - `repository`: [`MssqlRepository`], which owns the pool

mod operations;
mod pool;
mod repository;

pub use pool::{build_pool, build_tiberius_config, DbPool};
pub use repository::MssqlRepository;
