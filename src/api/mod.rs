//! REST API endpoints.
//!
//! Axum-based HTTP API for player lookup, autocomplete search
//! and the top-N ranking views.

pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::trace::TraceLayer;

use crate::store::{PlayerStore, StoreError};
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Database connection not ready")]
    NotReady,

    #[error("Player not found")]
    NotFound { player_name: String },

    /// The cause is logged, never returned to the caller.
    #[error("Internal server error")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(rename = "playerName", skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal(cause) => {
                tracing::error!("Request failed: {}", cause);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let error = self.to_string();
        let player_name = match self {
            ApiError::NotFound { player_name } => Some(player_name),
            _ => None,
        };

        (status, Json(ErrorResponse { error, player_name })).into_response()
    }
}

impl AppState {
    /// The connected store, or `NotReady` while startup is still connecting.
    pub fn store(&self) -> Result<Arc<dyn PlayerStore>, ApiError> {
        self.store.get().ok_or(ApiError::NotReady)
    }
}

/// Reject every routed request until the store is installed.
async fn require_store(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.store.is_ready() {
        return ApiError::NotReady.into_response();
    }
    next.run(request).await
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(routes::hello))
        .route("/api/search/players", get(routes::players::search_players))
        .route("/api/player/:name", get(routes::players::get_player))
        .route("/api/top-goleadores", get(routes::rankings::top_scorers))
        .route("/api/top-goleros", get(routes::rankings::top_goalkeepers))
        .route("/api/top-defensas", get(routes::rankings::top_defenders))
        .route("/api/top-touches", get(routes::rankings::top_touches))
        .route("/api/top-asistidores", get(routes::rankings::top_assists))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_store))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
