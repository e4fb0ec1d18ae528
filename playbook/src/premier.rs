//! Premier season tracking.
//!
//! DESIGN
//! ======
//! The season is a list of weeks, each with one map and an inclusive date
//! range, followed by a playoff day. Provider season data replaces the
//! built-in schedule when it yields at least one week.
//!
//! Points are derived from the match list on demand: every match inside a
//! scheduled week scores the win or loss value. Matches outside the schedule
//! do not count.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::{date, format_description};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

pub const MAX_WEEKS: usize = 7;
pub const LEADERBOARD_SIZE: usize = 20;

const WEEK_EVENT_TYPES: [&str; 2] = ["RANKED_GAME_WEEK", "GAME_WEEK"];

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremierConfig {
    pub team_name: String,
    pub team_tag: String,
    pub region: String,
    pub qualify_threshold: u32,
    pub points_win: u32,
    pub points_loss: u32,
}

impl Default for PremierConfig {
    fn default() -> Self {
        Self {
            team_name: "oh_hell_nah".into(),
            team_tag: "whaat".into(),
            region: "ap".into(),
            qualify_threshold: 600,
            points_win: 100,
            points_loss: 25,
        }
    }
}

// =============================================================================
// SCHEDULE
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Week {
    pub week: u32,
    pub map: String,
    #[serde(with = "iso_date")]
    pub start: Date,
    #[serde(with = "iso_date")]
    pub end: Date,
}

impl Week {
    /// Both ends inclusive.
    #[must_use]
    pub fn contains(&self, day: Date) -> bool {
        self.start <= day && day <= self.end
    }

    #[must_use]
    pub fn key(&self) -> String {
        week_key(self.week)
    }
}

#[must_use]
pub fn week_key(week: u32) -> String {
    format!("week{week}")
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub weeks: Vec<Week>,
    #[serde(with = "iso_date")]
    pub playoff: Date,
}

const PLAYOFF: Date = date!(2026 - 03 - 01);

fn week(number: u32, map: &str, start: Date, end: Date) -> Week {
    Week { week: number, map: map.to_owned(), start, end }
}

impl Default for Schedule {
    /// Built-in V26A1 schedule.
    fn default() -> Self {
        Self {
            weeks: vec![
                week(1, "Split", date!(2026 - 01 - 14), date!(2026 - 01 - 18)),
                week(2, "Breeze", date!(2026 - 01 - 21), date!(2026 - 01 - 25)),
                week(3, "Pearl", date!(2026 - 01 - 28), date!(2026 - 02 - 01)),
                week(4, "Bind", date!(2026 - 02 - 04), date!(2026 - 02 - 08)),
                week(5, "Abyss", date!(2026 - 02 - 11), date!(2026 - 02 - 15)),
                week(6, "Corrode", date!(2026 - 02 - 18), date!(2026 - 02 - 22)),
                week(7, "Haven", date!(2026 - 02 - 25), date!(2026 - 02 - 28)),
            ],
            playoff: PLAYOFF,
        }
    }
}

impl Schedule {
    /// Schedule from provider events, or the built-in one when the events
    /// contain no usable week.
    #[must_use]
    pub fn from_events(events: &[SeasonEvent]) -> Self {
        let weeks = parse_season(events);
        if weeks.is_empty() { Self::default() } else { Self { weeks, playoff: PLAYOFF } }
    }

    #[must_use]
    pub fn week_for_date(&self, day: Date) -> Option<u32> {
        self.weeks.iter().find(|w| w.contains(day)).map(|w| w.week)
    }

    /// Week for a provider timestamp such as `2026-01-15T14:30:00Z`.
    #[must_use]
    pub fn week_for_timestamp(&self, timestamp: &str) -> Option<u32> {
        parse_day(timestamp).and_then(|day| self.week_for_date(day))
    }

    /// Week in progress on `today`. `None` between weeks or off-season.
    #[must_use]
    pub fn current_week(&self, today: Date) -> Option<&Week> {
        self.weeks.iter().find(|w| w.contains(today))
    }

    /// Weeks whose last day is before `today`.
    pub fn past_weeks(&self, today: Date) -> impl Iterator<Item = &Week> {
        self.weeks.iter().filter(move |w| w.end < today)
    }

    #[must_use]
    pub fn is_playoff(&self, today: Date) -> bool {
        today >= self.playoff
    }
}

/// Provider season event. Only game-week events become schedule weeks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub map_selection: Option<MapSelection>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSelection {
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Date portion of an ISO timestamp or a bare `YYYY-MM-DD`.
#[must_use]
pub fn parse_day(timestamp: &str) -> Option<Date> {
    let day = timestamp.split('T').next()?;
    Date::parse(day.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// Game weeks numbered from 1 in event order, at most [`MAX_WEEKS`].
/// Events without parseable dates are dropped after numbering.
#[must_use]
pub fn parse_season(events: &[SeasonEvent]) -> Vec<Week> {
    events
        .iter()
        .filter(|e| WEEK_EVENT_TYPES.contains(&e.kind.as_str()))
        .take(MAX_WEEKS)
        .zip(1u32..)
        .filter_map(|(event, number)| {
            let map = event
                .map_selection
                .as_ref()
                .and_then(|m| m.display_name.clone())
                .unwrap_or_else(|| format!("Week {number}"));
            let start = parse_day(event.start_time.as_deref()?)?;
            let end = parse_day(event.end_time.as_deref()?)?;
            Some(Week { week: number, map, start, end })
        })
        .collect()
}

// =============================================================================
// POINTS
// =============================================================================

/// One match from the team's history. Either shape of the provider payload
/// is accepted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremierMatch {
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub won: Option<bool>,
    #[serde(default)]
    pub metadata: Option<MatchMetadata>,
    #[serde(default)]
    pub teams: Option<MatchTeams>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchMetadata {
    #[serde(default)]
    pub started_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTeams {
    #[serde(default)]
    pub red: Option<TeamOutcome>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamOutcome {
    #[serde(default)]
    pub won: Option<bool>,
}

impl PremierMatch {
    #[must_use]
    pub fn started_at(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.started_at.as_deref()).or(self.started_at.as_deref())
    }

    #[must_use]
    pub fn is_win(&self) -> bool {
        let red = self.teams.as_ref().and_then(|t| t.red.as_ref()).and_then(|r| r.won);
        red.unwrap_or(false) || self.won.unwrap_or(false)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekPoints {
    pub wins: u32,
    pub losses: u32,
    pub points: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub total: u32,
    pub by_week: BTreeMap<u32, WeekPoints>,
    pub qualified: bool,
    pub points_to_go: u32,
}

#[must_use]
pub fn standing(config: &PremierConfig, schedule: &Schedule, matches: &[PremierMatch]) -> Standing {
    let mut result = Standing::default();
    for m in matches {
        let Some(week) = m.started_at().and_then(|ts| schedule.week_for_timestamp(ts)) else { continue };
        let entry = result.by_week.entry(week).or_default();
        let points = if m.is_win() {
            entry.wins = entry.wins.saturating_add(1);
            config.points_win
        } else {
            entry.losses = entry.losses.saturating_add(1);
            config.points_loss
        };
        entry.points = entry.points.saturating_add(points);
        result.total = result.total.saturating_add(points);
    }
    result.qualified = result.total >= config.qualify_threshold;
    result.points_to_go = config.qualify_threshold.saturating_sub(result.total);
    result
}

// =============================================================================
// LINKED COMPOSITIONS
// =============================================================================

/// Saved composition ids linked to each week, keyed `week<N>`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkedComps(BTreeMap<String, Vec<String>>);

impl LinkedComps {
    /// Returns `false` when the link already existed.
    pub fn link(&mut self, week: u32, comp_id: &str) -> bool {
        let ids = self.0.entry(week_key(week)).or_default();
        if ids.iter().any(|id| id == comp_id) {
            return false;
        }
        ids.push(comp_id.to_owned());
        true
    }

    /// Returns `false` when there was nothing to unlink.
    pub fn unlink(&mut self, week: u32, comp_id: &str) -> bool {
        let Some(ids) = self.0.get_mut(&week_key(week)) else { return false };
        let before = ids.len();
        ids.retain(|id| id != comp_id);
        ids.len() != before
    }

    /// Link if absent, unlink if present. Returns the new linked state.
    pub fn toggle(&mut self, week: u32, comp_id: &str) -> bool {
        if self.is_linked(week, comp_id) {
            self.unlink(week, comp_id);
            false
        } else {
            self.link(week, comp_id)
        }
    }

    #[must_use]
    pub fn linked(&self, week: u32) -> &[String] {
        self.0.get(&week_key(week)).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn is_linked(&self, week: u32, comp_id: &str) -> bool {
        self.linked(week).iter().any(|id| id == comp_id)
    }
}

// =============================================================================
// LEADERBOARD
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub team_tag: Option<String>,
    #[serde(default)]
    pub points: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub team_name: String,
    pub team_tag: String,
    pub points: Option<u32>,
    pub is_own: bool,
}

/// Top [`LEADERBOARD_SIZE`] entries in provider order, own team flagged by
/// case-insensitive name.
#[must_use]
pub fn leaderboard(config: &PremierConfig, entries: &[LeaderboardEntry]) -> Vec<LeaderboardRow> {
    let own = config.team_name.to_lowercase();
    entries
        .iter()
        .take(LEADERBOARD_SIZE)
        .enumerate()
        .map(|(i, e)| {
            let name = e.team_name.clone().unwrap_or_default();
            LeaderboardRow {
                rank: i + 1,
                is_own: !name.is_empty() && name.to_lowercase() == own,
                team_name: name,
                team_tag: e.team_tag.clone().unwrap_or_default(),
                points: e.points,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "premier_test.rs"]
mod tests;
