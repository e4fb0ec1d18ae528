use ceremony::{Face, Side, resolve_toss};

use super::*;
use crate::config::AppConfig;
use crate::state::test_helpers;

fn finished_row() -> FinishedCeremony {
    let mut maps = vec![MapState::available("Bind"), MapState::available("Split")];
    maps[0].status = ceremony::MapStatus::Banned;
    maps[0].team = Some(Team::A);
    maps[1].status = ceremony::MapStatus::Picked;
    maps[1].team = Some(Team::B);
    maps[1].side = Some(Side::Attack);
    FinishedCeremony {
        id: Uuid::new_v4(),
        session_id: Uuid::new_v4(),
        format: Format::Bo1,
        strategy: SequenceStrategy::Scaling,
        teams: TeamNames::default(),
        toss: resolve_toss(Team::A, Face::Heads, Face::Heads),
        first: Team::A,
        sequence: vec![Step::ban(Team::A), Step::pick(Team::B)],
        summary: ceremony::summarize(&maps),
        maps,
        finished_at: 1,
    }
}

#[test]
fn retry_delay_is_linear() {
    let config = AppConfig::default().persist;
    assert_eq!(retry_delay(config, 1), Duration::from_millis(config.retry_base_ms));
    assert_eq!(retry_delay(config, 3), Duration::from_millis(3 * config.retry_base_ms));
}

#[tokio::test]
async fn enqueue_without_database_is_noop() {
    let state = test_helpers::test_app_state();
    assert!(state.persist_tx.is_none());
    assert!(!enqueue_finished(&state, finished_row()));
}

#[tokio::test]
async fn enqueue_hands_row_to_worker_queue() {
    let mut state = test_helpers::test_app_state();
    let (tx, mut rx) = mpsc::channel(2);
    state.persist_tx = Some(tx);

    let row = finished_row();
    assert!(enqueue_finished(&state, row.clone()));
    assert_eq!(rx.recv().await, Some(row));
}

#[tokio::test]
async fn enqueue_drops_when_queue_full() {
    let mut state = test_helpers::test_app_state();
    let (tx, _rx) = mpsc::channel(1);
    state.persist_tx = Some(tx);

    assert!(enqueue_finished(&state, finished_row()));
    assert!(!enqueue_finished(&state, finished_row()));
}

#[tokio::test]
async fn enqueue_drops_when_worker_gone() {
    let mut state = test_helpers::test_app_state();
    let (tx, rx) = mpsc::channel(4);
    drop(rx);
    state.persist_tx = Some(tx);

    assert!(!enqueue_finished(&state, finished_row()));
}

#[test]
fn archive_row_serializes_summary() {
    let json = serde_json::to_value(finished_row()).unwrap();
    assert_eq!(json["format"], "bo1");
    assert_eq!(json["summary"]["team_a_bans"][0], "Bind");
    assert_eq!(json["summary"]["team_b_picks"][0]["map"], "Split");
}
