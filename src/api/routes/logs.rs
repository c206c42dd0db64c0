//! Log Routes
//!
//! Header CRUD plus the channel-data surface.
//!
//! - GET /api/v1/logs - List log headers, optional `filter` expression
//! - POST /api/v1/logs - Register a log header
//! - GET /api/v1/logs/data - Query headers with embedded data
//! - POST /api/v1/logs/data - Append or update channel data
//! - DELETE /api/v1/logs/data - Cascade-delete a log and its chunks

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::dto::{DeleteResponse, ListParams, LogDataParams, LogDataRequest, LogListResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::logs::{Log, LogQuery};
use crate::store::parse_filter;

/// GET /api/v1/logs
pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<LogListResponse>> {
    let filter = parse_filter(params.filter.as_deref().unwrap_or_default())?;
    let logs = state.logs.list_logs(&filter).await?;
    Ok(Json(LogListResponse {
        total: logs.len(),
        logs,
    }))
}

/// POST /api/v1/logs
pub async fn create_log(
    State(state): State<Arc<AppState>>,
    Json(log): Json<Log>,
) -> ApiResult<(StatusCode, Json<Log>)> {
    if log.uid.is_empty() || log.uri.is_empty() {
        return Err(ApiError::Validation(
            "Log uid and uri are required".to_string(),
        ));
    }
    if log.index_type.is_none() || log.index_curve.is_empty() {
        return Err(ApiError::Validation(
            "Log indexType and indexCurve are required".to_string(),
        ));
    }
    if state.logs.get_log(&log.uri).await?.is_some() {
        return Err(ApiError::Validation(format!(
            "Log {} already exists",
            log.uri
        )));
    }
    state.logs.add_log(&log).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

/// GET /api/v1/logs/data
pub async fn query_log_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LogDataParams>,
) -> ApiResult<Json<Vec<Log>>> {
    let query: LogQuery = params.into();
    let logs = state
        .logs
        .query_headers_and_data(&query, &state.context)
        .await?;
    Ok(Json(logs))
}

/// POST /api/v1/logs/data
pub async fn update_log_data(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LogDataRequest>,
) -> ApiResult<StatusCode> {
    let uri = request.uri.clone();
    let log = state
        .logs
        .get_log(&uri)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Log {}", uri)))?;

    let reader = request.into_reader(&log)?;
    state.logs.update_data(&uri, vec![reader]).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Parameters for data deletion
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub uri: String,
}

/// DELETE /api/v1/logs/data
pub async fn delete_log_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DeleteParams>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = state.logs.delete_data(&params.uri).await?;
    Ok(Json(DeleteResponse { deleted }))
}
