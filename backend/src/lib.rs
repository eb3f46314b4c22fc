//! # RealFlow API
//!
//! Read-only service over the RealFlow metering feed.
//!
//! Flow meters on the loading berths write a row into `dbo.realflow5m` when a
//! transfer starts and another when it ends. This crate serves those rows and
//! reconciles them into job records (one per loading or unloading job) with a
//! computed duration. The backend exposes a REST API via Axum.
//!
//! ## Architecture
//!
//! - [`models`]: feed rows, job records, timestamps and durations
//! - [`services`]: the time-slot reconciler (pure, no I/O)
//! - [`db`]: repository pattern, SQL Server and in-memory backends, configuration
//! - [`http`]: Axum-based HTTP server and request handlers
//!

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod db;
pub mod models;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
