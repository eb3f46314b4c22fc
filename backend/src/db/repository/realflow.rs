//! Repository trait for the RealFlow feed.
//!
//! The feed is read-only from this service's point of view: rows are written
//! by the metering system and only ever fetched here.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::RawRecord;

/// Read access to one partition of the `realflow5m` table.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait RealflowRepository: Send + Sync {
    /// Check if the backend is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Fetch every record of the configured partition.
    ///
    /// # Returns
    /// * `Ok(Vec<RawRecord>)` - Records in ascending sequence order
    /// * `Err(RepositoryError)` - If the operation fails
    async fn fetch_records(&self) -> RepositoryResult<Vec<RawRecord>>;

    /// Fetch a single record by sequence number.
    ///
    /// # Returns
    /// * `Ok(Some(RawRecord))` - The record
    /// * `Ok(None)` - No record with that sequence in the partition
    /// * `Err(RepositoryError)` - If the operation fails
    async fn fetch_record(&self, sequence: i64) -> RepositoryResult<Option<RawRecord>>;

    /// Short name of the backend, used in logs and the health endpoint.
    fn backend_name(&self) -> &'static str;
}
