//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{Method, StatusCode},
    Json,
};

use super::dto::{
    timestamp_now, HealthResponse, JobsQuery, JobsResponse, RecordListResponse, RecordResponse,
    RouteNotFoundResponse, ServiceInfo, SERVICE_NAME,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::services::{self as db_services, SortOrder};
use crate::services::UnmatchedPolicy;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Service Info & Health
// =============================================================================

/// GET /
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo::current())
}

/// GET /health
///
/// Health check endpoint to verify the service is running and database is accessible.
/// Always answers 200; the `database` field carries the backend state.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e.message()),
    };

    Ok(Json(HealthResponse {
        status: "OK".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.uptime_secs(),
        timestamp: timestamp_now(),
        database: db_status,
    }))
}

// =============================================================================
// Feed Records
// =============================================================================

/// GET /api/realflow-data
///
/// All feed rows of the configured partition, newest first.
pub async fn list_records(State(state): State<AppState>) -> HandlerResult<RecordListResponse> {
    let records =
        db_services::list_records(state.repository.as_ref(), SortOrder::Descending).await?;
    log::info!("Returning {} records", records.len());

    Ok(Json(RecordListResponse {
        success: true,
        count: records.len(),
        data: records,
        timestamp: timestamp_now(),
    }))
}

/// GET /api/realflow-data/{id}
pub async fn get_record(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> HandlerResult<RecordResponse> {
    let sequence = parse_record_id(&raw_id)?;
    let record = db_services::get_record(state.repository.as_ref(), sequence).await?;

    Ok(Json(RecordResponse {
        success: true,
        data: record,
        timestamp: timestamp_now(),
    }))
}

fn parse_record_id(raw: &str) -> Result<i64, AppError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::InvalidRecordId(raw.to_string())),
    }
}

// =============================================================================
// Jobs
// =============================================================================

/// GET /api/realflow-jobs
///
/// Feed rows reconciled into job records. `?unmatched=drop|incomplete`
/// overrides the configured policy for this request.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobsQuery>,
) -> HandlerResult<JobsResponse> {
    let policy = match query.unmatched.as_deref() {
        Some(raw) => raw.parse::<UnmatchedPolicy>().map_err(AppError::BadRequest)?,
        None => state.unmatched_policy,
    };

    let summary = db_services::reconcile_jobs(state.repository.as_ref(), policy).await?;

    Ok(Json(JobsResponse {
        success: true,
        data: summary.jobs,
        count: summary.count,
        total_records: summary.total_records,
        timestamp: timestamp_now(),
    }))
}

// =============================================================================
// Fallback
// =============================================================================

/// Any route not matched above.
pub async fn not_found(
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> (StatusCode, Json<RouteNotFoundResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(RouteNotFoundResponse {
            success: false,
            message: "Endpoint not found".to_string(),
            path: uri.to_string(),
            method: method.to_string(),
            timestamp: timestamp_now(),
        }),
    )
}
