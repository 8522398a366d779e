//! REST API endpoints.
//!
//! Axum-based HTTP API for balancing requests, the roster and the
//! monitoring log.

pub mod routes;
pub mod state;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::balance::BalanceError;
use crate::monitoring::MonitoringError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Balance(#[from] BalanceError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<MonitoringError> for ApiError {
    fn from(e: MonitoringError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Balance(BalanceError::InsufficientPlayers { .. }) => {
                (StatusCode::BAD_REQUEST, "INSUFFICIENT_PLAYERS")
            }
            ApiError::Balance(BalanceError::UnresolvedIdentifiers(_)) => {
                (StatusCode::BAD_REQUEST, "UNRESOLVED_IDENTIFIERS")
            }
            ApiError::Balance(BalanceError::InvalidStats(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_PLAYER_STATS")
            }
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/api/simulate", post(routes::simulate::simulate))
        .route("/api/players", get(routes::players::list_players))
        .route("/api/monitoring", get(routes::monitoring::list_entries))
        .route("/api/monitoring/summary", get(routes::monitoring::summary))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }

    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
        Err(_) => {
            warn!("Invalid CORS origin {:?}, cross-origin requests disabled", origin);
            CorsLayer::new()
        }
    }
}
