//! Derrick REST API
//!
//! HTTP surface for the server, built with Axum. This is a serving shell
//! over the adapters, not a WITSML protocol implementation.
//!
//! # Endpoints
//!
//! ## Objects
//! - `GET /api/v1/wells` / `POST /api/v1/wells`
//! - `GET|PUT|DELETE /api/v1/wells/:uid`
//! - `GET /api/v1/wellbores` / `POST /api/v1/wellbores`
//! - `GET|DELETE /api/v1/wellbores/:uid`
//!
//! ## Logs and channel data
//! - `GET /api/v1/logs` - Header listing with optional `filter` expression
//! - `POST /api/v1/logs` - Register a log header
//! - `GET /api/v1/logs/data` - Headers with embedded data
//! - `POST /api/v1/logs/data` - Append or update channel data
//! - `DELETE /api/v1/logs/data` - Cascade delete
//!
//! ## Health
//! - `GET /health/live`, `GET /health/ready`, `GET /health`

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Well routes
        .route("/wells", get(routes::wells::list_wells))
        .route("/wells", post(routes::wells::create_well))
        .route("/wells/:uid", get(routes::wells::get_well))
        .route("/wells/:uid", put(routes::wells::update_well))
        .route("/wells/:uid", delete(routes::wells::delete_well))
        // Wellbore routes
        .route("/wellbores", get(routes::wellbores::list_wellbores))
        .route("/wellbores", post(routes::wellbores::create_wellbore))
        .route("/wellbores/:uid", get(routes::wellbores::get_wellbore))
        .route("/wellbores/:uid", delete(routes::wellbores::delete_wellbore))
        // Log routes
        .route("/logs", get(routes::logs::list_logs))
        .route("/logs", post(routes::logs::create_log))
        .route("/logs/data", get(routes::logs::query_log_data))
        .route("/logs/data", post(routes::logs::update_log_data))
        .route("/logs/data", delete(routes::logs::delete_log_data));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Derrick API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Derrick API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelSettings;
    use crate::store::FileStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let store = Arc::new(FileStore::in_memory());
        let state = AppState::new(store, ChannelSettings::default(), ApiConfig::default());
        build_router(state)
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_wells_empty() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/wells")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_well() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/wells")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"uid": "w1", "name": "Alpha", "uri": "eml://well(w1)"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_create_well_missing_uid() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/wells")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"uid": "", "name": "Alpha"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_missing_log_is_empty_list() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/logs/data?uri=eml://well(w1)/log(missing)")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_bad_filter_expression_rejected() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/logs?filter=name%20gt%20'Alpha'")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
