//! High-level database service layer.
//!
//! Repository-agnostic operations used by the HTTP handlers. They work with
//! any [`RealflowRepository`] and hold the rules that must not depend on the
//! storage backend: sort order of listings, validation of record ids, and
//! reconciliation of the feed into jobs.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  HTTP handlers (http/handlers.rs)            │
//! └───────────────────┬──────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────┐
//! │  Service Layer (services.rs)                 │
//! │  - Sort order of listings                    │
//! │  - Id validation                             │
//! │  - Reconciliation into jobs                  │
//! └───────────────────┬──────────────────────────┘
//!                     │
//!     ┌───────────────┴──────────────┐
//!     │                              │
//! ┌───▼──────────────┐   ┌───────────▼─────────┐
//! │ Mssql Repository │   │ Local Repository    │
//! │ (tiberius + bb8) │   │ (in-memory)         │
//! └──────────────────┘   └─────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use realflow_api::db::{services, repositories::LocalRepository};
//! use realflow_api::services::UnmatchedPolicy;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let summary = services::reconcile_jobs(&repo, UnmatchedPolicy::Drop).await?;
//!     println!("{} jobs from {} records", summary.count, summary.total_records);
//!     Ok(())
//! }
//! ```

use log::{info, warn};

use super::repository::{ErrorContext, RealflowRepository, RepositoryError, RepositoryResult};
use crate::models::{JobRecord, RawRecord};
use crate::services::{reconcile, ReconcileWarning, UnmatchedPolicy};

/// Order of a record listing by sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    /// Newest first, as the raw listing endpoint serves it.
    #[default]
    Descending,
}

/// Result of reconciling the whole feed.
#[derive(Debug, Clone)]
pub struct JobsSummary {
    pub jobs: Vec<JobRecord>,
    pub count: usize,
    /// Raw rows the jobs were built from.
    pub total_records: usize,
    pub warnings: Vec<ReconcileWarning>,
}

// ==================== Health & Connection ====================

/// Check if the backend is reachable.
pub async fn health_check<R: RealflowRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Record Operations ====================

/// All feed rows in the requested order.
pub async fn list_records<R: RealflowRepository + ?Sized>(
    repo: &R,
    order: SortOrder,
) -> RepositoryResult<Vec<RawRecord>> {
    let mut records = repo.fetch_records().await?;
    if order == SortOrder::Descending {
        records.reverse();
    }
    Ok(records)
}

/// A single feed row.
///
/// # Errors
/// * `ValidationError` when `sequence` is not positive
/// * `NotFound` when no row carries that sequence
pub async fn get_record<R: RealflowRepository + ?Sized>(
    repo: &R,
    sequence: i64,
) -> RepositoryResult<RawRecord> {
    let context = ErrorContext::new("get_record")
        .with_entity("realflow_record")
        .with_entity_id(sequence);

    if sequence <= 0 {
        return Err(RepositoryError::validation_with_context(
            "Record id must be a positive integer",
            context,
        ));
    }

    repo.fetch_record(sequence).await?.ok_or_else(|| {
        RepositoryError::not_found_with_context(format!("Record {} not found", sequence), context)
    })
}

// ==================== Job Operations ====================

/// Fetch the feed and reconcile it into jobs.
///
/// Warnings never fail the call; they are logged and returned alongside the
/// jobs.
pub async fn reconcile_jobs<R: RealflowRepository + ?Sized>(
    repo: &R,
    policy: UnmatchedPolicy,
) -> RepositoryResult<JobsSummary> {
    let records = repo.fetch_records().await?;
    let total_records = records.len();

    let outcome = tokio::task::spawn_blocking(move || reconcile(&records, policy))
        .await
        .map_err(|e| {
            RepositoryError::internal(format!("Reconciliation task failed: {}", e))
                .with_operation("reconcile_jobs")
        })?;

    if !outcome.warnings.is_empty() {
        warn!(
            "Reconciliation of {} records produced {} warnings",
            total_records,
            outcome.warnings.len()
        );
    }
    info!(
        "Reconciled {} records into {} jobs (policy: {})",
        total_records,
        outcome.count(),
        policy.as_str()
    );

    Ok(JobsSummary {
        count: outcome.jobs.len(),
        jobs: outcome.jobs,
        total_records,
        warnings: outcome.warnings,
    })
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod services_tests;
