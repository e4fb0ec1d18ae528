//! Ceremony REST routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use ceremony::{Face, Format, SequenceStrategy, SessionView, Side, Step, Summary, Team, TossResult, Turn, generate_sequence};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ApiError;
use crate::services::ceremony::{self as service, SessionError, SetupRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SequenceQuery {
    pub format: String,
    pub pool: usize,
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub strategy: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SequencePreview {
    pub format: Format,
    pub strategy: SequenceStrategy,
    pub first: Team,
    pub pool: usize,
    pub steps: Vec<Step>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub id: Uuid,
    pub view: SessionView,
}

#[derive(Debug, Deserialize)]
pub struct CallerBody {
    pub team: Team,
}

#[derive(Debug, Deserialize)]
pub struct TossBody {
    pub call: Face,
}

#[derive(Debug, Deserialize)]
pub struct OrderBody {
    pub go_first: bool,
}

#[derive(Debug, Deserialize)]
pub struct ActionBody {
    pub map: String,
}

#[derive(Debug, Deserialize)]
pub struct SideBody {
    pub map: String,
    pub side: Side,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TossResponse {
    pub toss: TossResult,
    pub view: SessionView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TurnResponse {
    pub turn: Turn,
    pub view: SessionView,
}

fn invalid(err: impl std::fmt::Display) -> ApiError {
    ApiError(SessionError::Validation(err.to_string()))
}

/// `GET /api/maps`: competitive catalog map names.
pub async fn list_maps(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let names = state.catalog.map_names().await.map_err(SessionError::from)?;
    Ok(Json(names))
}

/// `GET /api/sequence`: preview a sequence without creating a session.
pub async fn preview_sequence(
    State(state): State<AppState>,
    Query(query): Query<SequenceQuery>,
) -> Result<Json<SequencePreview>, ApiError> {
    let format: Format = query.format.parse().map_err(invalid)?;
    let first: Team = query.first.as_deref().unwrap_or("0").parse().map_err(invalid)?;
    let strategy = match query.strategy.as_deref() {
        Some(raw) => raw.parse::<SequenceStrategy>().map_err(invalid)?,
        None => state.config.strategy,
    };
    let steps = generate_sequence(strategy, format, query.pool, first)?;
    Ok(Json(SequencePreview { format, strategy, first, pool: query.pool, steps }))
}

/// `POST /api/ceremonies`: create a session in the coin-toss stage.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<SetupRequest>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let (id, view) = service::create_ceremony(&state, &body).await?;
    Ok((StatusCode::CREATED, Json(Created { id, view })))
}

/// `GET /api/ceremonies/:id`
pub async fn show(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(service::get_view(&state, id).await?))
}

/// `DELETE /api/ceremonies/:id`
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    service::delete_ceremony(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/ceremonies/:id/start`: new setup after a reset.
pub async fn start(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetupRequest>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(service::start_ceremony(&state, id, &body).await?))
}

pub async fn caller(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CallerBody>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(service::nominate_caller(&state, id, body.team).await?))
}

pub async fn toss(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<TossBody>,
) -> Result<Json<TossResponse>, ApiError> {
    let (toss, view) = service::call_toss(&state, id, body.call).await?;
    Ok(Json(TossResponse { toss, view }))
}

pub async fn order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<OrderBody>,
) -> Result<Json<TurnResponse>, ApiError> {
    let (turn, view) = service::choose_order(&state, id, body.go_first).await?;
    Ok(Json(TurnResponse { turn, view }))
}

pub async fn action(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ActionBody>,
) -> Result<Json<TurnResponse>, ApiError> {
    let (turn, view) = service::act(&state, id, &body.map).await?;
    Ok(Json(TurnResponse { turn, view }))
}

pub async fn side(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SideBody>,
) -> Result<Json<TurnResponse>, ApiError> {
    let (turn, view) = service::choose_side(&state, id, &body.map, body.side).await?;
    Ok(Json(TurnResponse { turn, view }))
}

pub async fn reset(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(service::reset(&state, id).await?))
}

/// `GET /api/ceremonies/:id/summary`: partial while the ceremony runs.
pub async fn summary(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Summary>, ApiError> {
    Ok(Json(service::get_summary(&state, id).await?))
}
