//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the REST API under `/api`, the ceremony WebSocket
//! at `/api/ws`, and `/healthz`. Handlers translate HTTP to service calls;
//! all ceremony rules live in the service and engine.

pub mod ceremonies;
pub mod playbook;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use ceremony::CeremonyError;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::catalog::CatalogError;
use crate::frame::{ErrorCode, FRAME_CODE, FRAME_MESSAGE, FRAME_RETRYABLE};
use crate::services::ceremony::SessionError;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/maps", get(ceremonies::list_maps))
        .route("/api/sequence", get(ceremonies::preview_sequence))
        .route("/api/ceremonies", post(ceremonies::create))
        .route("/api/ceremonies/{id}", get(ceremonies::show).delete(ceremonies::delete))
        .route("/api/ceremonies/{id}/start", post(ceremonies::start))
        .route("/api/ceremonies/{id}/caller", post(ceremonies::caller))
        .route("/api/ceremonies/{id}/toss", post(ceremonies::toss))
        .route("/api/ceremonies/{id}/order", post(ceremonies::order))
        .route("/api/ceremonies/{id}/actions", post(ceremonies::action))
        .route("/api/ceremonies/{id}/side", post(ceremonies::side))
        .route("/api/ceremonies/{id}/reset", post(ceremonies::reset))
        .route("/api/ceremonies/{id}/summary", get(ceremonies::summary))
        .route("/api/compositions/stats", post(playbook::composition_stats))
        .route("/api/premier/standing", post(playbook::premier_standing))
        .route("/api/ws", get(ws::handle_ws))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// ERRORS
// =============================================================================

pub(crate) fn session_error_to_status(err: &SessionError) -> StatusCode {
    match err {
        SessionError::NotFound(_) => StatusCode::NOT_FOUND,
        SessionError::Ceremony(CeremonyError::IllegalAction(_)) => StatusCode::CONFLICT,
        SessionError::Ceremony(_) | SessionError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SessionError::Catalog(CatalogError::HttpClientBuild(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        SessionError::Catalog(_) => StatusCode::BAD_GATEWAY,
    }
}

/// JSON error body: `{ code, message, retryable }`.
#[derive(Debug)]
pub struct ApiError(pub SessionError);

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self(err)
    }
}

impl From<CeremonyError> for ApiError {
    fn from(err: CeremonyError) -> Self {
        Self(SessionError::Ceremony(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = session_error_to_status(&self.0);
        if status.is_server_error() {
            tracing::warn!(code = self.0.error_code(), error = %self.0, "api: request failed");
        }
        let body = serde_json::json!({
            FRAME_CODE: self.0.error_code(),
            FRAME_MESSAGE: self.0.to_string(),
            FRAME_RETRYABLE: self.0.retryable(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
