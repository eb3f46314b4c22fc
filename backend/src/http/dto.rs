//! Data Transfer Objects for the HTTP API.
//!
//! Every response carries a `timestamp` in RFC 3339 UTC with millisecond
//! precision. Record and job payloads keep the feed's column names.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub use crate::models::{JobRecord, RawRecord};

pub const SERVICE_NAME: &str = "RealFlow API";

/// Current time as sent in response bodies.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub description: String,
    pub endpoints: BTreeMap<String, String>,
    pub timestamp: String,
}

impl ServiceInfo {
    pub fn current() -> Self {
        let endpoints = [
            ("GET /", "Service information"),
            ("GET /health", "Health check"),
            ("GET /api/realflow-data", "All feed records, newest first"),
            ("GET /api/realflow-data/{id}", "Single feed record by sequence number"),
            ("GET /api/realflow-jobs", "Reconciled job records"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            service: SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "RealFlow metering feed and job reconciliation".to_string(),
            endpoints,
            timestamp: timestamp_now(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// Seconds since startup
    pub uptime: f64,
    pub timestamp: String,
    /// `connected`, `disconnected` or `error: ...`
    pub database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordListResponse {
    pub success: bool,
    pub data: Vec<RawRecord>,
    pub count: usize,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResponse {
    pub success: bool,
    pub data: RawRecord,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobsResponse {
    pub success: bool,
    pub data: Vec<JobRecord>,
    pub count: usize,
    /// Raw rows the jobs were reconciled from
    pub total_records: usize,
    pub timestamp: String,
}

/// Query parameters for `GET /api/realflow-jobs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobsQuery {
    /// `drop` or `incomplete`; overrides the configured policy
    pub unmatched: Option<String>,
}

/// Error envelope shared by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<i64>,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: None,
            record_id: None,
            timestamp: timestamp_now(),
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Body of the 404 fallback for unknown routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteNotFoundResponse {
    pub success: bool,
    pub message: String,
    pub path: String,
    pub method: String,
    pub timestamp: String,
}
