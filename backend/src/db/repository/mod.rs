//! Repository trait definitions for database operations.
//!
//! - [`error`]: Error types for repository operations
//! - [`realflow`]: Read access to the `realflow5m` feed
//!
//! Handlers and services depend on `Arc<dyn RealflowRepository>` and never
//! on a concrete backend.

pub mod error;
pub mod realflow;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use realflow::RealflowRepository;
