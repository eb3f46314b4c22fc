//! In-memory local repository implementation.
//!
//! Holds feed rows in a `Vec` behind a lock. Used by tests and for running the
//! server without a SQL Server instance, optionally seeded from a JSON file
//! containing an array of records keyed by the source column names.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::RawRecord;

/// In-memory local repository.
///
/// # Example
/// ```
/// use realflow_api::db::repositories::LocalRepository;
/// use realflow_api::models::RawRecord;
///
/// let repo = LocalRepository::with_records(vec![RawRecord::new(1)]);
/// assert_eq!(repo.len(), 1);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    records: Vec<RawRecord>,
    is_healthy: bool,
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Create a repository holding `records`.
    pub fn with_records(records: Vec<RawRecord>) -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData {
                records,
                is_healthy: true,
            })),
        }
    }

    /// Load records from a JSON array file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let context = ErrorContext::new("load_seed_file").with_details(path.display().to_string());

        let content = fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to read seed file: {}", e),
                context.clone(),
            )
        })?;
        let records: Vec<RawRecord> = serde_json::from_str(&content).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to parse seed file: {}", e),
                context,
            )
        })?;

        Ok(Self::with_records(records))
    }

    /// Add a record, replacing any existing record with the same sequence.
    pub fn insert_record(&self, record: RawRecord) {
        let mut data = self.data.write();
        data.records.retain(|r| r.sequence != record.sequence);
        data.records.push(record);
    }

    /// Simulate the backend going up or down.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    pub fn len(&self) -> usize {
        self.data.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_available(&self, operation: &str) -> RepositoryResult<()> {
        if self.data.read().is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::connection_with_context(
                "Local repository is marked unavailable",
                ErrorContext::new(operation),
            ))
        }
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RealflowRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn fetch_records(&self) -> RepositoryResult<Vec<RawRecord>> {
        self.ensure_available("fetch_records")?;
        let mut records = self.data.read().records.clone();
        records.sort_by_key(|r| r.sequence);
        Ok(records)
    }

    async fn fetch_record(&self, sequence: i64) -> RepositoryResult<Option<RawRecord>> {
        self.ensure_available("fetch_record")?;
        Ok(self
            .data
            .read()
            .records
            .iter()
            .find(|r| r.sequence == sequence)
            .cloned())
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
