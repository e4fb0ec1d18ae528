use time::macros::date;

use super::*;

fn event(kind: &str, map: &str, start: &str, end: &str) -> SeasonEvent {
    SeasonEvent {
        kind: kind.into(),
        map_selection: Some(MapSelection { display_name: Some(map.into()) }),
        start_time: Some(start.into()),
        end_time: Some(end.into()),
    }
}

fn played(at: &str, won: bool) -> PremierMatch {
    PremierMatch { started_at: Some(at.into()), won: Some(won), ..PremierMatch::default() }
}

#[test]
fn fallback_schedule_has_seven_weeks() {
    let schedule = Schedule::default();
    assert_eq!(schedule.weeks.len(), MAX_WEEKS);
    assert_eq!(schedule.weeks[0].map, "Split");
    assert_eq!(schedule.weeks[6].map, "Haven");
    assert_eq!(schedule.playoff, date!(2026 - 03 - 01));
}

#[test]
fn week_lookup_is_inclusive_on_both_ends() {
    let schedule = Schedule::default();
    assert_eq!(schedule.week_for_date(date!(2026 - 01 - 14)), Some(1));
    assert_eq!(schedule.week_for_date(date!(2026 - 01 - 18)), Some(1));
    assert_eq!(schedule.week_for_date(date!(2026 - 01 - 19)), None);
    assert_eq!(schedule.week_for_date(date!(2026 - 02 - 01)), Some(3));
    assert_eq!(schedule.week_for_timestamp("2026-02-28T23:59:00Z"), Some(7));
    assert_eq!(schedule.week_for_timestamp("not a date"), None);
}

#[test]
fn current_and_past_weeks() {
    let schedule = Schedule::default();
    let today = date!(2026 - 02 - 05);
    assert_eq!(schedule.current_week(today).map(|w| w.map.as_str()), Some("Bind"));
    assert_eq!(schedule.past_weeks(today).count(), 3);
    assert!(!schedule.is_playoff(today));
    assert!(schedule.is_playoff(date!(2026 - 03 - 01)));
}

#[test]
fn parse_season_keeps_only_game_weeks() {
    let events = vec![
        event("SIGNUP", "Lobby", "2026-01-01T00:00:00Z", "2026-01-10T00:00:00Z"),
        event("RANKED_GAME_WEEK", "Ascent", "2026-01-14T00:00:00Z", "2026-01-18T00:00:00Z"),
        event("GAME_WEEK", "Lotus", "2026-01-21T00:00:00Z", "2026-01-25T00:00:00Z"),
        event("PLAYOFFS", "Bind", "2026-03-01T00:00:00Z", "2026-03-01T00:00:00Z"),
    ];
    let weeks = parse_season(&events);
    assert_eq!(weeks.len(), 2);
    assert_eq!(weeks[0].week, 1);
    assert_eq!(weeks[0].map, "Ascent");
    assert_eq!(weeks[1].week, 2);
    assert_eq!(weeks[1].end, date!(2026 - 01 - 25));
}

#[test]
fn parse_season_caps_at_seven_and_names_missing_maps() {
    let mut events: Vec<SeasonEvent> =
        (10..20).map(|d| event("GAME_WEEK", "Split", &format!("2026-01-{d}"), &format!("2026-01-{d}"))).collect();
    events[0].map_selection = None;
    let weeks = parse_season(&events);
    assert_eq!(weeks.len(), MAX_WEEKS);
    assert_eq!(weeks[0].map, "Week 1");
}

#[test]
fn empty_season_falls_back() {
    assert_eq!(Schedule::from_events(&[]), Schedule::default());
    let events = vec![event("SIGNUP", "x", "2026-01-01", "2026-01-02")];
    assert_eq!(Schedule::from_events(&events), Schedule::default());
}

#[test]
fn standing_sums_points_per_week() {
    let config = PremierConfig::default();
    let schedule = Schedule::default();
    let matches = vec![
        played("2026-01-15T15:00:00Z", true),
        played("2026-01-16T15:00:00Z", false),
        played("2026-01-22T15:00:00Z", true),
        played("2025-12-01T15:00:00Z", true),
    ];
    let s = standing(&config, &schedule, &matches);
    assert_eq!(s.total, 225);
    assert_eq!(s.by_week[&1], WeekPoints { wins: 1, losses: 1, points: 125 });
    assert_eq!(s.by_week[&2], WeekPoints { wins: 1, losses: 0, points: 100 });
    assert!(!s.qualified);
    assert_eq!(s.points_to_go, 375);
}

#[test]
fn standing_qualifies_at_threshold() {
    let config = PremierConfig::default();
    let matches: Vec<PremierMatch> = (0..6).map(|_| played("2026-02-12T12:00:00Z", true)).collect();
    let s = standing(&config, &Schedule::default(), &matches);
    assert_eq!(s.total, 600);
    assert!(s.qualified);
    assert_eq!(s.points_to_go, 0);
}

#[test]
fn standing_saturates_on_huge_point_values() {
    let config = PremierConfig { points_win: u32::MAX, ..PremierConfig::default() };
    let matches = vec![played("2026-01-15T15:00:00Z", true), played("2026-01-16T15:00:00Z", true)];
    let s = standing(&config, &Schedule::default(), &matches);
    assert_eq!(s.total, u32::MAX);
    assert_eq!(s.by_week[&1], WeekPoints { wins: 2, losses: 0, points: u32::MAX });
    assert!(s.qualified);
    assert_eq!(s.points_to_go, 0);
}

#[test]
fn nested_payload_shape_is_understood() {
    let raw = r#"{"metadata":{"started_at":"2026-01-29T10:00:00Z"},"teams":{"red":{"won":true}}}"#;
    let m: PremierMatch = serde_json::from_str(raw).unwrap();
    assert_eq!(m.started_at(), Some("2026-01-29T10:00:00Z"));
    assert!(m.is_win());
    assert_eq!(Schedule::default().week_for_timestamp(m.started_at().unwrap()), Some(3));
}

#[test]
fn linking_is_idempotent() {
    let mut linked = LinkedComps::default();
    assert!(linked.link(3, "comp-a"));
    assert!(!linked.link(3, "comp-a"));
    assert!(linked.link(3, "comp-b"));
    assert_eq!(linked.linked(3), ["comp-a", "comp-b"]);

    assert!(linked.unlink(3, "comp-a"));
    assert!(!linked.unlink(3, "comp-a"));
    assert!(!linked.unlink(5, "comp-a"));
    assert_eq!(linked.linked(3), ["comp-b"]);
    assert!(linked.linked(4).is_empty());
}

#[test]
fn toggle_flips_link_state() {
    let mut linked = LinkedComps::default();
    assert!(linked.toggle(1, "c"));
    assert!(linked.is_linked(1, "c"));
    assert!(!linked.toggle(1, "c"));
    assert!(!linked.is_linked(1, "c"));
}

#[test]
fn linked_comps_serialize_by_week_key() {
    let mut linked = LinkedComps::default();
    linked.link(2, "c1");
    assert_eq!(serde_json::to_value(&linked).unwrap(), serde_json::json!({ "week2": ["c1"] }));
}

#[test]
fn leaderboard_flags_own_team_and_caps_rows() {
    let config = PremierConfig::default();
    let mut entries: Vec<LeaderboardEntry> = (0..25)
        .map(|i| LeaderboardEntry { team_name: Some(format!("team{i}")), team_tag: None, points: Some(1000 - i) })
        .collect();
    entries[4].team_name = Some("OH_HELL_NAH".into());

    let rows = leaderboard(&config, &entries);
    assert_eq!(rows.len(), LEADERBOARD_SIZE);
    assert_eq!(rows[0].rank, 1);
    assert!(rows[4].is_own);
    assert_eq!(rows.iter().filter(|r| r.is_own).count(), 1);
    assert_eq!(rows[19].points, Some(981));
}

#[test]
fn week_serializes_iso_dates() {
    let json = serde_json::to_value(&Schedule::default().weeks[0]).unwrap();
    assert_eq!(json["start"], "2026-01-14");
    assert_eq!(json["end"], "2026-01-18");
    let back: Week = serde_json::from_value(json).unwrap();
    assert_eq!(back, Schedule::default().weeks[0]);
}

#[test]
fn parse_day_accepts_dates_and_timestamps() {
    assert_eq!(parse_day("2026-02-05"), Some(date!(2026 - 02 - 05)));
    assert_eq!(parse_day("2026-02-05T08:00:00Z"), Some(date!(2026 - 02 - 05)));
    assert_eq!(parse_day("05/02/2026"), None);
}
