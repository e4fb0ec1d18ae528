//! Ceremony service: live sessions, turn handling, and state fan-out.
//!
//! DESIGN
//! ======
//! Sessions live in `AppState::ceremonies`. Every mutation takes the write
//! lock, runs one engine transition, snapshots the view, and pushes a
//! `ceremony:state` frame to each subscriber before the lock is released, so
//! subscribers observe transitions in the order they were applied.
//!
//! Fan-out uses `try_send`: a full subscriber queue skips that frame and a
//! closed one is pruned. A session that reaches completion is handed to the
//! persistence queue exactly once.

use ceremony::{
    CeremonyError, Face, MatchSetup, MapPool, PoolSelection, SequenceStrategy, Session, SessionView, Side, Summary,
    Team, TeamNames, TossResult, Turn, COMPETITIVE_POOL,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::CatalogError;
use crate::frame::{Data, Frame};
use crate::services::persistence::{FinishedCeremony, enqueue_finished};
use crate::state::{AppState, CeremonyState};

pub const STATE_SYSCALL: &str = "ceremony:state";
pub const CLOSED_SYSCALL: &str = "ceremony:closed";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("ceremony not found: {0}")]
    NotFound(Uuid),
    #[error(transparent)]
    Ceremony(#[from] CeremonyError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("invalid request: {0}")]
    Validation(String),
}

impl crate::frame::ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::Ceremony(CeremonyError::InsufficientMaps { .. }) => "E_INSUFFICIENT_MAPS",
            Self::Ceremony(CeremonyError::TooManyMaps { .. }) => "E_TOO_MANY_MAPS",
            Self::Ceremony(CeremonyError::IllegalAction(_)) => "E_ILLEGAL_ACTION",
            Self::Ceremony(CeremonyError::DuplicateMap(_) | CeremonyError::EmptyMapName) | Self::Validation(_) => {
                "E_VALIDATION"
            }
            Self::Catalog(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Catalog(e) => e.retryable(),
            _ => false,
        }
    }
}

/// Everything a client chooses before the toss.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupRequest {
    pub format: Option<ceremony::Format>,
    #[serde(default)]
    pub strategy: Option<SequenceStrategy>,
    #[serde(default)]
    pub team_a: Option<String>,
    #[serde(default)]
    pub team_b: Option<String>,
    #[serde(default)]
    pub pool: PoolSelection,
}

// =============================================================================
// SETUP
// =============================================================================

/// Resolve a setup request against the catalog and server defaults.
///
/// `Custom` pools never touch the catalog. `Competitive` falls back to the
/// built-in rotation when the catalog is unreachable; `All` cannot.
///
/// # Errors
///
/// Validation errors for a missing format or bad pool, or a catalog error.
pub async fn resolve_setup(state: &AppState, req: &SetupRequest) -> Result<MatchSetup, SessionError> {
    let format = req.format.ok_or_else(|| SessionError::Validation("format is required".into()))?;
    let names = match &req.pool {
        PoolSelection::Custom(_) => req.pool.resolve(&[]),
        PoolSelection::Competitive => match state.catalog.map_names().await {
            Ok(catalog) => req.pool.resolve(&catalog),
            Err(e) => {
                warn!(error = %e, "map catalog unavailable; using built-in competitive pool");
                COMPETITIVE_POOL.iter().map(|name| (*name).to_string()).collect()
            }
        },
        PoolSelection::All => {
            let catalog = state.catalog.map_names().await?;
            req.pool.resolve(&catalog)
        }
    };

    let setup = MatchSetup {
        format,
        strategy: req.strategy.unwrap_or(state.config.strategy),
        teams: TeamNames::new(req.team_a.as_deref().unwrap_or(""), req.team_b.as_deref().unwrap_or("")),
        pool: MapPool::new(names)?,
    };
    setup.validate()?;
    Ok(setup)
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Create a session and move it straight to the coin toss.
///
/// # Errors
///
/// Any [`resolve_setup`] error; nothing is stored on failure.
pub async fn create_ceremony(state: &AppState, req: &SetupRequest) -> Result<(Uuid, SessionView), SessionError> {
    let setup = resolve_setup(state, req).await?;
    let mut session = Session::new();
    session.start(setup)?;
    let view = session.view();

    let id = Uuid::new_v4();
    state.ceremonies.write().await.insert(id, CeremonyState::new(session));
    info!(%id, format = ?view.format, maps = view.maps.len(), "ceremony created");
    Ok((id, view))
}

/// Start a session that was reset back to setup.
///
/// # Errors
///
/// `NotFound`, setup errors, or `WrongStage` when not in setup.
pub async fn start_ceremony(state: &AppState, id: Uuid, req: &SetupRequest) -> Result<SessionView, SessionError> {
    let setup = resolve_setup(state, req).await?;
    mutate(state, id, |session| session.start(setup)).await.map(|((), view)| view)
}

/// # Errors
///
/// `NotFound` for an unknown id.
pub async fn get_view(state: &AppState, id: Uuid) -> Result<SessionView, SessionError> {
    let ceremonies = state.ceremonies.read().await;
    ceremonies.get(&id).map(|entry| entry.session.view()).ok_or(SessionError::NotFound(id))
}

/// Running summary. Partial mid-ceremony.
///
/// # Errors
///
/// `NotFound`, or `WrongStage` before ban/pick.
pub async fn get_summary(state: &AppState, id: Uuid) -> Result<Summary, SessionError> {
    let ceremonies = state.ceremonies.read().await;
    let entry = ceremonies.get(&id).ok_or(SessionError::NotFound(id))?;
    Ok(entry.session.summary()?)
}

/// Drop a session and tell its subscribers.
///
/// # Errors
///
/// `NotFound` for an unknown id.
pub async fn delete_ceremony(state: &AppState, id: Uuid) -> Result<(), SessionError> {
    let removed = state.ceremonies.write().await.remove(&id).ok_or(SessionError::NotFound(id))?;
    let frame = Frame::request(CLOSED_SYSCALL, Data::new()).with_ceremony_id(id);
    for tx in removed.clients.values() {
        let _ = tx.try_send(frame.clone());
    }
    info!(%id, subscribers = removed.clients.len(), "ceremony deleted");
    Ok(())
}

// =============================================================================
// TRANSITIONS
// =============================================================================

/// # Errors
///
/// `NotFound`, or `WrongStage` outside the coin toss.
pub async fn nominate_caller(state: &AppState, id: Uuid, team: Team) -> Result<SessionView, SessionError> {
    mutate(state, id, |session| session.nominate_caller(team)).await.map(|((), view)| view)
}

/// Draw a face with the server's toss policy and resolve the call.
///
/// # Errors
///
/// `NotFound`, `WrongStage`, or `NoCaller`. No face is drawn on error.
pub async fn call_toss(state: &AppState, id: Uuid, call: Face) -> Result<(TossResult, SessionView), SessionError> {
    let result = mutate(state, id, |session| session.toss_with(call, || state.draw_face())).await?;
    info!(%id, call = %call, drawn = %result.0.drawn, winner = %result.0.winner, "coin toss resolved");
    Ok(result)
}

/// # Errors
///
/// `NotFound`, or `WrongStage` outside the order choice.
pub async fn choose_order(state: &AppState, id: Uuid, winner_goes_first: bool) -> Result<(Turn, SessionView), SessionError> {
    mutate(state, id, |session| session.choose_order(winner_goes_first)).await
}

/// Ban or pick `map` for whichever team is due.
///
/// # Errors
///
/// `NotFound`, or the engine's `IllegalAction`. State is unchanged on error.
pub async fn act(state: &AppState, id: Uuid, map: &str) -> Result<(Turn, SessionView), SessionError> {
    mutate(state, id, |session| session.apply_ban_or_pick(map)).await
}

/// # Errors
///
/// `NotFound`, or `SideNotPending` when `map` is not awaiting a side.
pub async fn choose_side(state: &AppState, id: Uuid, map: &str, side: Side) -> Result<(Turn, SessionView), SessionError> {
    mutate(state, id, |session| session.apply_side(map, side)).await
}

/// Back to setup; pool, sequence, map states, and toss are all cleared.
///
/// # Errors
///
/// `NotFound` for an unknown id.
pub async fn reset(state: &AppState, id: Uuid) -> Result<SessionView, SessionError> {
    mutate(state, id, |session| {
        session.reset();
        Ok(())
    })
    .await
    .map(|((), view)| view)
}

// =============================================================================
// SUBSCRIPTIONS
// =============================================================================

/// Register a client for `ceremony:state` pushes and return the current view.
///
/// # Errors
///
/// `NotFound` for an unknown id.
pub async fn subscribe(
    state: &AppState,
    id: Uuid,
    client_id: Uuid,
    tx: mpsc::Sender<Frame>,
) -> Result<SessionView, SessionError> {
    let mut ceremonies = state.ceremonies.write().await;
    let entry = ceremonies.get_mut(&id).ok_or(SessionError::NotFound(id))?;
    entry.clients.insert(client_id, tx);
    Ok(entry.session.view())
}

pub async fn unsubscribe(state: &AppState, id: Uuid, client_id: Uuid) {
    let mut ceremonies = state.ceremonies.write().await;
    if let Some(entry) = ceremonies.get_mut(&id) {
        entry.clients.remove(&client_id);
    }
}

// =============================================================================
// INTERNALS
// =============================================================================

async fn mutate<T>(
    state: &AppState,
    id: Uuid,
    op: impl FnOnce(&mut Session) -> Result<T, CeremonyError>,
) -> Result<(T, SessionView), SessionError> {
    let mut ceremonies = state.ceremonies.write().await;
    let entry = ceremonies.get_mut(&id).ok_or(SessionError::NotFound(id))?;

    let was_complete = entry.session.is_complete();
    let out = op(&mut entry.session)?;
    let view = entry.session.view();
    broadcast_view(entry, id, &view);

    if !was_complete && entry.session.is_complete() {
        if let Some(row) = finished_row(id, &entry.session) {
            info!(%id, "ceremony complete");
            enqueue_finished(state, row);
        }
    }

    Ok((out, view))
}

/// Serialize a view into frame data under `view`.
#[must_use]
pub fn view_data(view: &SessionView) -> Data {
    let mut data = Data::new();
    data.insert("view".into(), serde_json::to_value(view).unwrap_or_default());
    data
}

fn broadcast_view(entry: &mut CeremonyState, id: Uuid, view: &SessionView) {
    if entry.clients.is_empty() {
        return;
    }
    let frame = Frame::request(STATE_SYSCALL, view_data(view)).with_ceremony_id(id);
    entry.clients.retain(|client_id, tx| match tx.try_send(frame.clone()) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!(%id, %client_id, "subscriber queue full; skipping state frame");
            true
        }
        Err(mpsc::error::TrySendError::Closed(_)) => false,
    });
}

fn finished_row(id: Uuid, session: &Session) -> Option<FinishedCeremony> {
    let setup = session.setup()?;
    let toss = session.toss()?;
    let ceremony = session.ceremony()?;
    Some(FinishedCeremony {
        id: Uuid::new_v4(),
        session_id: id,
        format: setup.format,
        strategy: setup.strategy,
        teams: setup.teams.clone(),
        toss,
        first: ceremony.first(),
        sequence: ceremony.sequence().to_vec(),
        maps: ceremony.maps().to_vec(),
        summary: ceremony.summary(),
        finished_at: crate::frame::now_ms(),
    })
}

#[cfg(test)]
#[path = "ceremony_test.rs"]
mod tests;
