//! Well Routes
//!
//! Thin CRUD endpoints forwarding to the well collection.
//!
//! - GET /api/v1/wells - List wells, optional `filter` expression
//! - POST /api/v1/wells - Create a well
//! - GET /api/v1/wells/:uid - Get a well
//! - PUT /api/v1/wells/:uid - Update a well
//! - DELETE /api/v1/wells/:uid - Delete a well

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{DeleteResponse, ListParams};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::objects::Well;
use crate::store::parse_filter;

/// GET /api/v1/wells
pub async fn list_wells(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Well>>> {
    let filter = parse_filter(params.filter.as_deref().unwrap_or_default())?;
    let wells = state.wells.list(&filter).await?;
    Ok(Json(wells))
}

/// GET /api/v1/wells/:uid
pub async fn get_well(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> ApiResult<Json<Well>> {
    let well = state
        .wells
        .get(&uid)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Well {}", uid)))?;
    Ok(Json(well))
}

/// POST /api/v1/wells
pub async fn create_well(
    State(state): State<Arc<AppState>>,
    Json(well): Json<Well>,
) -> ApiResult<(StatusCode, Json<Well>)> {
    if well.uid.is_empty() {
        return Err(ApiError::Validation("Well uid is required".to_string()));
    }
    if state.wells.get(&well.uid).await?.is_some() {
        return Err(ApiError::Validation(format!(
            "Well {} already exists",
            well.uid
        )));
    }
    state.wells.add(&well).await?;
    tracing::info!(uid = %well.uid, "Created well");
    Ok((StatusCode::CREATED, Json(well)))
}

/// PUT /api/v1/wells/:uid
pub async fn update_well(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
    Json(well): Json<Well>,
) -> ApiResult<Json<Well>> {
    let replaced = state.wells.update(&uid, &well).await?;
    if replaced == 0 {
        return Err(ApiError::NotFound(format!("Well {}", uid)));
    }
    Ok(Json(well))
}

/// DELETE /api/v1/wells/:uid
pub async fn delete_well(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = state.wells.delete(&uid).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!("Well {}", uid)));
    }
    Ok(Json(DeleteResponse { deleted }))
}
