use ceremony::{ActionKind, MapState, MapStatus, StageKind};

use super::*;

fn setup(format: Format) -> SetupArgs {
    SetupArgs { format, strategy: None, team_a: None, team_b: None, pool: PoolArg::Competitive, maps: Vec::new() }
}

fn view(turn: Option<Turn>, maps: Vec<MapState>) -> SessionView {
    SessionView {
        stage: StageKind::BanPick,
        format: Some(Format::Bo1),
        strategy: Some(SequenceStrategy::Scaling),
        teams: Some(ceremony::TeamNames::new("Oh Hell Nah", "")),
        calling: Some(Team::A),
        toss: None,
        first: Some(Team::A),
        sequence: Vec::new(),
        maps,
        turn,
        summary: None,
        complete: false,
    }
}

#[test]
fn ws_url_maps_scheme_and_ceremony() {
    let id = Uuid::nil();
    assert_eq!(ws_url("http://localhost:3000/", id).unwrap(), format!("ws://localhost:3000/api/ws?ceremony={id}"));
    assert_eq!(ws_url("https://strat.example", id).unwrap(), format!("wss://strat.example/api/ws?ceremony={id}"));
    assert!(matches!(ws_url("ftp://nope", id), Err(CliError::InvalidBaseUrl(_))));
}

#[test]
fn setup_body_prefers_custom_maps() {
    let body = setup_body(&setup(Format::Bo3));
    assert_eq!(body["format"], "bo3");
    assert_eq!(body["pool"], json!({ "kind": "competitive" }));
    assert_eq!(body["strategy"], Value::Null);

    let mut args = setup(Format::Bo1);
    args.pool = PoolArg::All;
    assert_eq!(setup_body(&args)["pool"], json!({ "kind": "all" }));

    args.maps = vec!["Bind".into(), "Split".into()];
    args.strategy = Some(SequenceStrategy::Fixed);
    let body = setup_body(&args);
    assert_eq!(body["pool"], json!({ "kind": "custom", "maps": ["Bind", "Split"] }));
    assert_eq!(body["strategy"], "fixed");
}

#[test]
fn error_message_reads_api_error_bodies() {
    let body = json!({ "code": "E_ILLEGAL_ACTION", "message": "illegal action: ceremony is already complete" });
    assert_eq!(error_message(&body), "E_ILLEGAL_ACTION: illegal action: ceremony is already complete");
    assert_eq!(error_message(&Value::Null), "null");
}

#[test]
fn sequence_renders_numbered_steps() {
    let steps = generate_sequence(SequenceStrategy::Scaling, Format::Bo1, 2, Team::B).unwrap();
    assert_eq!(render_sequence(&steps), " 1. Ban 1\n 2. Pick 1\n");
}

#[test]
fn describe_uses_team_names() {
    let turn = Turn::Act { index: 0, team: Team::A, kind: ActionKind::Ban };
    assert_eq!(describe(&view(Some(turn), Vec::new())), "Oh Hell Nah: Ban");

    let turn = Turn::ChooseSide { map: "Bind".into(), team: Team::B };
    assert_eq!(describe(&view(Some(turn), Vec::new())), "Team B: choose side on Bind");
}

#[test]
fn describe_lists_picks_when_complete() {
    let maps = vec![
        MapState { name: "Split".into(), status: MapStatus::Banned, team: Some(Team::A), side: None },
        MapState { name: "Bind".into(), status: MapStatus::Picked, team: Some(Team::A), side: Some(Side::Attack) },
    ];
    assert_eq!(describe(&view(Some(Turn::Complete), maps)), "complete: Bind (attack)");
}

#[test]
fn sequence_rejects_oversized_pool() {
    let err = generate_sequence(SequenceStrategy::Scaling, Format::Bo1, usize::MAX, Team::A).map_err(CliError::from);
    assert!(matches!(err, Err(CliError::Ceremony(ceremony::CeremonyError::TooManyMaps { .. }))));
}
