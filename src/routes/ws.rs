//! WebSocket handler: one socket per ceremony subscriber.
//!
//! DESIGN
//! ======
//! The upgrade names a ceremony (`/api/ws?ceremony=<id>`). The connection is
//! subscribed for `ceremony:state` pushes, then enters a `select!` loop:
//! - Incoming client frames → parse + dispatch by syscall prefix
//! - Pushed frames from the service → forward to client
//!
//! Handlers return reply data or an error frame; they never write to the socket. Every
//! mutation is fanned out by the service itself, so the sender sees its own
//! change twice: once as the `done` reply, once as `ceremony:state`.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `session:connected` with `client_id` and the view
//! 2. Client sends `ceremony:*` frames → dispatch → reply
//! 3. Close → unsubscribe

use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ceremony::{Face, Side, Team};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::frame::{Data, FRAME_CODE, FRAME_MESSAGE, Frame, Status};
use crate::services::ceremony::{self as service, SessionError, SetupRequest, view_data};
use crate::state::AppState;

const CLIENT_QUEUE: usize = 256;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(ceremony_id) = params.get("ceremony").and_then(|raw| raw.parse::<Uuid>().ok()) else {
        return (StatusCode::BAD_REQUEST, "ceremony id required").into_response();
    };
    if service::get_view(&state, ceremony_id).await.is_err() {
        return (StatusCode::NOT_FOUND, "ceremony not found").into_response();
    }

    ws.on_upgrade(move |socket| run_ws(socket, state, ceremony_id))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, ceremony_id: Uuid) {
    let client_id = Uuid::new_v4();
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(CLIENT_QUEUE);

    let view = match service::subscribe(&state, ceremony_id, client_id, client_tx).await {
        Ok(view) => view,
        Err(e) => {
            warn!(%client_id, %ceremony_id, error = %e, "ws: subscribe failed");
            return;
        }
    };

    let welcome = Frame::request("session:connected", view_data(&view))
        .with_ceremony_id(ceremony_id)
        .with_data("client_id", client_id.to_string());
    if send_frame(&mut socket, &welcome).await.is_err() {
        service::unsubscribe(&state, ceremony_id, client_id).await;
        return;
    }

    info!(%client_id, %ceremony_id, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        for frame in process_inbound_text(&state, ceremony_id, client_id, text.as_str()).await {
                            let _ = send_frame(&mut socket, &frame).await;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            pushed = client_rx.recv() => {
                let Some(frame) = pushed else { break };
                let closed = frame.syscall == service::CLOSED_SYSCALL;
                if send_frame(&mut socket, &frame).await.is_err() || closed {
                    break;
                }
            }
        }
    }

    service::unsubscribe(&state, ceremony_id, client_id).await;
    info!(%client_id, %ceremony_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse and handle one inbound text frame; returns frames for the sender.
async fn process_inbound_text(state: &AppState, ceremony_id: Uuid, client_id: Uuid, text: &str) -> Vec<Frame> {
    let mut req: Frame = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            let err = Frame::request("gateway:error", Data::new()).with_data(FRAME_MESSAGE, format!("invalid json: {e}"));
            return vec![err];
        }
    };

    req.from = Some(client_id.to_string());
    info!(%client_id, id = %req.id, syscall = %req.syscall, "ws: recv frame");

    if req.ceremony_id.is_some_and(|id| id != ceremony_id) {
        return vec![req.error("ceremony_id does not match this connection")];
    }
    req.ceremony_id = Some(ceremony_id);

    let result = match req.prefix() {
        "ceremony" => handle_ceremony(state, ceremony_id, &req).await,
        prefix => Err(req.error(format!("unknown prefix: {prefix}"))),
    };

    match result {
        Ok(data) => vec![req.done_with(data)],
        Err(err_frame) => vec![err_frame],
    }
}

fn field<T: DeserializeOwned>(req: &Frame, key: &str) -> Result<T, Frame> {
    let invalid = |detail: String| req.error_from(&SessionError::Validation(detail));
    let value = req.data.get(key).cloned().ok_or_else(|| invalid(format!("{key} required")))?;
    serde_json::from_value(value).map_err(|e| invalid(format!("{key}: {e}")))
}

fn reply_with<const N: usize>(pairs: [(&str, serde_json::Value); N]) -> Data {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn to_value(value: impl serde::Serialize) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_default()
}

async fn handle_ceremony(state: &AppState, id: Uuid, req: &Frame) -> Result<Data, Frame> {
    let fail = |e: SessionError| req.error_from(&e);

    match req.op() {
        "view" => {
            let view = service::get_view(state, id).await.map_err(fail)?;
            Ok(view_data(&view))
        }
        "summary" => {
            let summary = service::get_summary(state, id).await.map_err(fail)?;
            Ok(reply_with([("summary", to_value(summary))]))
        }
        "start" => {
            let setup: SetupRequest =
                serde_json::from_value(to_value(&req.data)).map_err(|e| fail(SessionError::Validation(e.to_string())))?;
            let view = service::start_ceremony(state, id, &setup).await.map_err(fail)?;
            Ok(view_data(&view))
        }
        "caller" => {
            let team: Team = field(req, "team")?;
            let view = service::nominate_caller(state, id, team).await.map_err(fail)?;
            Ok(view_data(&view))
        }
        "toss" => {
            let call: Face = field(req, "call")?;
            let (toss, view) = service::call_toss(state, id, call).await.map_err(fail)?;
            Ok(reply_with([("toss", to_value(toss)), ("view", to_value(view))]))
        }
        "order" => {
            let go_first: bool = field(req, "go_first")?;
            let (turn, view) = service::choose_order(state, id, go_first).await.map_err(fail)?;
            Ok(reply_with([("turn", to_value(turn)), ("view", to_value(view))]))
        }
        "act" => {
            let map: String = field(req, "map")?;
            let (turn, view) = service::act(state, id, &map).await.map_err(fail)?;
            Ok(reply_with([("turn", to_value(turn)), ("view", to_value(view))]))
        }
        "side" => {
            let map: String = field(req, "map")?;
            let side: Side = field(req, "side")?;
            let (turn, view) = service::choose_side(state, id, &map, side).await.map_err(fail)?;
            Ok(reply_with([("turn", to_value(turn)), ("view", to_value(view))]))
        }
        "reset" => {
            let view = service::reset(state, id).await.map_err(fail)?;
            Ok(view_data(&view))
        }
        op => Err(req.error(format!("unknown ceremony op: {op}"))),
    }
}

// =============================================================================
// SEND
// =============================================================================

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), ()> {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize frame");
            return Err(());
        }
    };
    if frame.status == Status::Error {
        let code = frame.str_field(FRAME_CODE).unwrap_or("-");
        let message = frame.str_field(FRAME_MESSAGE).unwrap_or("-");
        warn!(id = %frame.id, syscall = %frame.syscall, code, message, "ws: send frame status=Error");
    } else {
        info!(id = %frame.id, syscall = %frame.syscall, status = ?frame.status, "ws: send frame");
    }
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
