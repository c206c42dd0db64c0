//! Wellbore Routes
//!
//! Thin CRUD endpoints forwarding to the wellbore collection.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{DeleteResponse, ListParams};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::objects::Wellbore;
use crate::store::parse_filter;

/// GET /api/v1/wellbores
pub async fn list_wellbores(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Wellbore>>> {
    let filter = parse_filter(params.filter.as_deref().unwrap_or_default())?;
    let wellbores = state.wellbores.list(&filter).await?;
    Ok(Json(wellbores))
}

/// GET /api/v1/wellbores/:uid
pub async fn get_wellbore(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> ApiResult<Json<Wellbore>> {
    let wellbore = state
        .wellbores
        .get(&uid)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Wellbore {}", uid)))?;
    Ok(Json(wellbore))
}

/// POST /api/v1/wellbores
pub async fn create_wellbore(
    State(state): State<Arc<AppState>>,
    Json(wellbore): Json<Wellbore>,
) -> ApiResult<(StatusCode, Json<Wellbore>)> {
    if wellbore.uid.is_empty() {
        return Err(ApiError::Validation("Wellbore uid is required".to_string()));
    }
    if state.wellbores.get(&wellbore.uid).await?.is_some() {
        return Err(ApiError::Validation(format!(
            "Wellbore {} already exists",
            wellbore.uid
        )));
    }
    state.wellbores.add(&wellbore).await?;
    tracing::info!(uid = %wellbore.uid, "Created wellbore");
    Ok((StatusCode::CREATED, Json(wellbore)))
}

/// DELETE /api/v1/wellbores/:uid
pub async fn delete_wellbore(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = state.wellbores.delete(&uid).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!("Wellbore {}", uid)));
    }
    Ok(Json(DeleteResponse { deleted }))
}
