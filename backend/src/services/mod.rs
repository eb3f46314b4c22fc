//! Service layer for business logic.
//!
//! Services are free of I/O. The database service layer in [`crate::db::services`]
//! fetches rows and hands them to the functions here.

pub mod reconciler;

pub use reconciler::{reconcile, ReconcileOutcome, ReconcileWarning, Reconciler, UnmatchedPolicy};
