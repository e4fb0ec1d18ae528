use ceremony::{ActionKind, Format, IllegalAction, MapStatus, StageKind};
use tokio::time::{Duration, timeout};

use super::*;
use crate::config::AppConfig;
use crate::frame::{ErrorCode, Status};
use crate::state::test_helpers;

const SIX: [&str; 6] = ["Abyss", "Ascent", "Bind", "Haven", "Lotus", "Split"];

fn custom(format: Format, maps: &[&str]) -> SetupRequest {
    SetupRequest {
        format: Some(format),
        team_a: Some("Oh Hell Nah".into()),
        team_b: Some("Whaat".into()),
        pool: PoolSelection::Custom(maps.iter().map(|m| (*m).to_string()).collect()),
        ..SetupRequest::default()
    }
}

async fn recv_state(rx: &mut mpsc::Receiver<Frame>) -> SessionView {
    let frame = timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("state frame timed out")
        .expect("state channel closed");
    assert_eq!(frame.syscall, STATE_SYSCALL);
    assert_eq!(frame.status, Status::Request);
    serde_json::from_value(frame.data["view"].clone()).expect("view payload")
}

/// Create, nominate team A, toss, and let the winner go first.
async fn ban_pick_ceremony(state: &AppState, req: &SetupRequest) -> (Uuid, Team) {
    let (id, _) = create_ceremony(state, req).await.unwrap();
    nominate_caller(state, id, Team::A).await.unwrap();
    let (toss, _) = call_toss(state, id, Face::Heads).await.unwrap();
    let (turn, _) = choose_order(state, id, true).await.unwrap();
    assert_eq!(turn, Turn::Act { index: 0, team: toss.winner, kind: ActionKind::Ban });
    (id, toss.winner)
}

// =============================================================================
// SETUP
// =============================================================================

#[tokio::test]
async fn create_moves_to_coin_toss() {
    let state = test_helpers::test_app_state();
    let (id, view) = create_ceremony(&state, &custom(Format::Bo3, &SIX)).await.unwrap();
    assert_eq!(view.stage, StageKind::CoinToss);
    assert_eq!(view.teams.as_ref().map(|t| t.a.as_str()), Some("Oh Hell Nah"));
    assert_eq!(view.maps.len(), 6);
    assert_eq!(get_view(&state, id).await.unwrap(), view);
}

#[tokio::test]
async fn competitive_pool_filters_catalog() {
    let state = test_helpers::test_app_state();
    let req = SetupRequest { format: Some(Format::Bo3), ..SetupRequest::default() };
    let setup = resolve_setup(&state, &req).await.unwrap();
    assert_eq!(setup.pool.names(), COMPETITIVE_POOL);
    assert_eq!(setup.teams, TeamNames::default());
    assert_eq!(setup.strategy, SequenceStrategy::Scaling);
}

#[tokio::test]
async fn competitive_pool_survives_catalog_outage() {
    let state = test_helpers::test_app_state_with(AppConfig::default(), Vec::new());
    let req = SetupRequest { format: Some(Format::Bo3), ..SetupRequest::default() };
    let setup = resolve_setup(&state, &req).await.unwrap();
    assert_eq!(setup.pool.len(), COMPETITIVE_POOL.len());
}

#[tokio::test]
async fn full_catalog_requires_the_catalog() {
    let state = test_helpers::test_app_state_with(AppConfig::default(), Vec::new());
    let req = SetupRequest { format: Some(Format::Bo1), pool: PoolSelection::All, ..SetupRequest::default() };
    let err = resolve_setup(&state, &req).await.unwrap_err();
    assert_eq!(err.error_code(), "E_CATALOG_RESPONSE");
    assert!(err.retryable());
}

#[tokio::test]
async fn server_strategy_applies_unless_overridden() {
    let config = AppConfig { strategy: SequenceStrategy::Fixed, ..AppConfig::default() };
    let state = test_helpers::test_app_state_with(config, test_helpers::catalog_maps());

    let err = create_ceremony(&state, &custom(Format::Bo3, &["A", "B", "C", "D", "E", "F"])).await.unwrap_err();
    assert_eq!(err.error_code(), "E_INSUFFICIENT_MAPS");

    let mut req = custom(Format::Bo3, &["A", "B", "C", "D", "E", "F"]);
    req.strategy = Some(SequenceStrategy::Scaling);
    assert!(create_ceremony(&state, &req).await.is_ok());
}

#[tokio::test]
async fn setup_errors_store_nothing() {
    let state = test_helpers::test_app_state();

    let err = create_ceremony(&state, &custom(Format::Bo5, &["Bind", "Split"])).await.unwrap_err();
    assert_eq!(err.error_code(), "E_INSUFFICIENT_MAPS");
    assert!(err.to_string().contains("at least 8"));

    let err = create_ceremony(&state, &custom(Format::Bo1, &["Bind", "Bind"])).await.unwrap_err();
    assert_eq!(err.error_code(), "E_VALIDATION");

    let err = create_ceremony(&state, &SetupRequest::default()).await.unwrap_err();
    assert_eq!(err.error_code(), "E_VALIDATION");

    assert!(state.ceremonies.read().await.is_empty());
}

// =============================================================================
// TRANSITIONS
// =============================================================================

#[tokio::test]
async fn unknown_ceremony_is_not_found() {
    let state = test_helpers::test_app_state();
    let id = Uuid::new_v4();
    assert!(matches!(get_view(&state, id).await, Err(SessionError::NotFound(missing)) if missing == id));
    assert_eq!(act(&state, id, "Bind").await.unwrap_err().error_code(), "E_NOT_FOUND");
    assert_eq!(delete_ceremony(&state, id).await.unwrap_err().error_code(), "E_NOT_FOUND");
}

#[tokio::test]
async fn toss_without_caller_is_illegal() {
    let state = test_helpers::test_app_state();
    let (id, _) = create_ceremony(&state, &custom(Format::Bo1, &["Bind", "Split"])).await.unwrap();
    let err = call_toss(&state, id, Face::Tails).await.unwrap_err();
    assert_eq!(err.error_code(), "E_ILLEGAL_ACTION");
    assert!(matches!(
        err,
        SessionError::Ceremony(CeremonyError::IllegalAction(IllegalAction::NoCaller))
    ));
    assert_eq!(get_view(&state, id).await.unwrap().stage, StageKind::CoinToss);
}

#[tokio::test]
async fn toss_winner_matches_call() {
    let state = test_helpers::test_app_state();
    let (id, _) = create_ceremony(&state, &custom(Format::Bo1, &["Bind", "Split"])).await.unwrap();
    nominate_caller(&state, id, Team::B).await.unwrap();
    let (toss, view) = call_toss(&state, id, Face::Heads).await.unwrap();
    let expected = if toss.drawn == Face::Heads { Team::B } else { Team::A };
    assert_eq!(toss.calling, Team::B);
    assert_eq!(toss.winner, expected);
    assert_eq!(view.stage, StageKind::OrderChoice);
}

#[tokio::test]
async fn bo1_runs_to_completion() {
    let state = test_helpers::test_app_state();
    let (id, first) = ban_pick_ceremony(&state, &custom(Format::Bo1, &["Bind", "Split"])).await;

    let (turn, _) = act(&state, id, "Bind").await.unwrap();
    assert_eq!(turn, Turn::Act { index: 1, team: first, kind: ActionKind::Pick });
    let (turn, _) = act(&state, id, "Split").await.unwrap();
    assert_eq!(turn, Turn::ChooseSide { map: "Split".into(), team: first.opponent() });
    let (turn, view) = choose_side(&state, id, "Split", Side::Attack).await.unwrap();
    assert_eq!(turn, Turn::Complete);
    assert!(view.complete);

    let summary = get_summary(&state, id).await.unwrap();
    assert_eq!(summary.bans(first), ["Bind"]);
    assert_eq!(summary.picks(first)[0].map, "Split");
}

#[tokio::test]
async fn illegal_action_leaves_state_unchanged() {
    let state = test_helpers::test_app_state();
    let (id, _) = ban_pick_ceremony(&state, &custom(Format::Bo3, &SIX)).await;
    act(&state, id, "Bind").await.unwrap();
    let before = get_view(&state, id).await.unwrap();

    for map in ["Bind", "Breeze"] {
        let err = act(&state, id, map).await.unwrap_err();
        assert_eq!(err.error_code(), "E_ILLEGAL_ACTION");
    }
    assert_eq!(get_view(&state, id).await.unwrap(), before);
}

#[tokio::test]
async fn summary_before_ban_pick_is_illegal() {
    let state = test_helpers::test_app_state();
    let (id, _) = create_ceremony(&state, &custom(Format::Bo1, &["Bind", "Split"])).await.unwrap();
    assert_eq!(get_summary(&state, id).await.unwrap_err().error_code(), "E_ILLEGAL_ACTION");
}

#[tokio::test]
async fn reset_then_start_again() {
    let state = test_helpers::test_app_state();
    let (id, _) = ban_pick_ceremony(&state, &custom(Format::Bo1, &["Bind", "Split"])).await;
    act(&state, id, "Bind").await.unwrap();

    let view = reset(&state, id).await.unwrap();
    assert_eq!(view.stage, StageKind::Setup);
    assert!(view.maps.is_empty());
    assert!(view.toss.is_none());

    let view = start_ceremony(&state, id, &custom(Format::Bo3, &SIX)).await.unwrap();
    assert_eq!(view.stage, StageKind::CoinToss);
    assert!(view.maps.iter().all(|m| m.status == MapStatus::Available));

    let err = start_ceremony(&state, id, &custom(Format::Bo1, &["Bind", "Split"])).await.unwrap_err();
    assert_eq!(err.error_code(), "E_ILLEGAL_ACTION");
}

// =============================================================================
// FAN-OUT
// =============================================================================

#[tokio::test]
async fn subscribers_receive_every_transition() {
    let state = test_helpers::test_app_state();
    let (id, _) = create_ceremony(&state, &custom(Format::Bo1, &["Bind", "Split"])).await.unwrap();
    let (tx, mut rx) = mpsc::channel(16);
    let view = subscribe(&state, id, Uuid::new_v4(), tx).await.unwrap();
    assert_eq!(view.stage, StageKind::CoinToss);

    nominate_caller(&state, id, Team::A).await.unwrap();
    assert_eq!(recv_state(&mut rx).await.calling, Some(Team::A));

    call_toss(&state, id, Face::Tails).await.unwrap();
    assert_eq!(recv_state(&mut rx).await.stage, StageKind::OrderChoice);

    let _ = act(&state, id, "Bind").await;
    assert!(timeout(Duration::from_millis(80), rx.recv()).await.is_err(), "rejected action must not broadcast");
}

#[tokio::test]
async fn closed_subscribers_are_pruned_and_full_ones_skipped() {
    let state = test_helpers::test_app_state();
    let (id, _) = create_ceremony(&state, &custom(Format::Bo1, &["Bind", "Split"])).await.unwrap();

    let (closed_tx, closed_rx) = mpsc::channel(1);
    drop(closed_rx);
    subscribe(&state, id, Uuid::new_v4(), closed_tx).await.unwrap();
    let (slow_tx, mut slow_rx) = mpsc::channel(1);
    subscribe(&state, id, Uuid::new_v4(), slow_tx).await.unwrap();

    nominate_caller(&state, id, Team::A).await.unwrap();
    nominate_caller(&state, id, Team::B).await.unwrap();

    assert_eq!(state.ceremonies.read().await[&id].clients.len(), 1);
    assert_eq!(recv_state(&mut slow_rx).await.calling, Some(Team::A));
}

#[tokio::test]
async fn delete_notifies_subscribers() {
    let state = test_helpers::test_app_state();
    let (id, _) = create_ceremony(&state, &custom(Format::Bo1, &["Bind", "Split"])).await.unwrap();
    let mut rx = test_helpers::subscribe(&state, id, 4).await;

    delete_ceremony(&state, id).await.unwrap();
    let frame = rx.recv().await.unwrap();
    assert_eq!(frame.syscall, CLOSED_SYSCALL);
    assert_eq!(frame.ceremony_id, Some(id));
    assert!(get_view(&state, id).await.is_err());
}

#[tokio::test]
async fn completion_is_archived_once() {
    let mut state = test_helpers::test_app_state();
    let (persist_tx, mut persist_rx) = mpsc::channel(4);
    state.persist_tx = Some(persist_tx);

    let (id, first) = ban_pick_ceremony(&state, &custom(Format::Bo1, &["Bind", "Split"])).await;
    act(&state, id, "Bind").await.unwrap();
    act(&state, id, "Split").await.unwrap();
    assert!(persist_rx.try_recv().is_err());

    choose_side(&state, id, "Split", Side::Defense).await.unwrap();
    let row = persist_rx.try_recv().unwrap();
    assert_eq!(row.session_id, id);
    assert_ne!(row.id, id);
    assert_eq!(row.first, first);
    assert_eq!(row.summary.picks(first.opponent()).len(), 0);
    assert_eq!(row.maps[1].side, Some(Side::Defense));

    let _ = act(&state, id, "Bind").await;
    assert!(persist_rx.try_recv().is_err());
}

#[tokio::test]
async fn rerun_after_reset_archives_a_new_row() {
    let mut state = test_helpers::test_app_state();
    let (persist_tx, mut persist_rx) = mpsc::channel(4);
    state.persist_tx = Some(persist_tx);
    let req = custom(Format::Bo1, &["Bind", "Split"]);

    let mut rows = Vec::new();
    let (id, _) = create_ceremony(&state, &req).await.unwrap();
    for run in 0..2 {
        if run > 0 {
            reset(&state, id).await.unwrap();
            start_ceremony(&state, id, &req).await.unwrap();
        }
        nominate_caller(&state, id, Team::A).await.unwrap();
        call_toss(&state, id, Face::Heads).await.unwrap();
        choose_order(&state, id, true).await.unwrap();
        act(&state, id, "Bind").await.unwrap();
        act(&state, id, "Split").await.unwrap();
        choose_side(&state, id, "Split", Side::Attack).await.unwrap();
        rows.push(persist_rx.try_recv().unwrap());
    }

    assert_ne!(rows[0].id, rows[1].id);
    assert!(rows.iter().all(|row| row.session_id == id));
    assert!(persist_rx.try_recv().is_err());
}
