//! Router construction and request handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use gq_error::{classify, ErrorClass, GqError};
use gq_query::{CountResponse, QueryExecutor, QueryRequest, QueryResponse};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::ServerConfig;

#[derive(Clone)]
struct AppState {
    executor: Arc<QueryExecutor>,
}

#[derive(Debug, Serialize, Copy, Clone)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// An error ready to leave the gateway.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn invalid_body() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "invalid request body".to_string(),
        }
    }
}

impl From<GqError> for ApiError {
    fn from(error: GqError) -> Self {
        let status = match classify(&error) {
            ErrorClass::Client => StatusCode::BAD_REQUEST,
            ErrorClass::Backend | ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(%error, "query failed");
        }
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

/// Assemble the gateway router.
pub fn build_router(executor: Arc<QueryExecutor>, config: &ServerConfig) -> Router {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "skipping unparsable CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/query", post(query))
        .route("/api/count", post(count))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { executor })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::invalid_body())?;
    Ok(Json(state.executor.query(&request).await?))
}

async fn count(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<CountResponse>, ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::invalid_body())?;
    Ok(Json(state.executor.count(&request).await?))
}
