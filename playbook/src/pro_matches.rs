//! Pro match reference data.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProTeam {
    pub name: String,
    pub region: String,
    pub score: u32,
    #[serde(default)]
    pub composition: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProMatch {
    pub id: String,
    pub map: String,
    pub tournament: String,
    pub date: String,
    pub team1: ProTeam,
    pub team2: ProTeam,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSlot {
    Team1,
    Team2,
}

impl TeamSlot {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Team1 => Self::Team2,
            Self::Team2 => Self::Team1,
        }
    }
}

/// A pro composition ready to be stored alongside the team's own comps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedProComp {
    pub map: String,
    pub agents: Vec<String>,
    pub notes: String,
}

impl ProMatch {
    /// Strictly higher score wins; a tie goes to `team2`.
    #[must_use]
    pub fn winner(&self) -> TeamSlot {
        if self.team1.score > self.team2.score { TeamSlot::Team1 } else { TeamSlot::Team2 }
    }

    #[must_use]
    pub fn team(&self, slot: TeamSlot) -> &ProTeam {
        match slot {
            TeamSlot::Team1 => &self.team1,
            TeamSlot::Team2 => &self.team2,
        }
    }

    #[must_use]
    pub fn involves_region(&self, region: &str) -> bool {
        self.team1.region == region || self.team2.region == region
    }

    #[must_use]
    pub fn save_comp(&self, slot: TeamSlot) -> SavedProComp {
        let team = self.team(slot);
        let opponent = self.team(slot.other());
        SavedProComp {
            map: self.map.clone(),
            agents: team.composition.clone(),
            notes: format!(
                "Pro Comp: {} vs {} ({}, {}) - Score: {}-{}",
                team.name, opponent.name, self.tournament, self.date, team.score, opponent.score
            ),
        }
    }
}

/// Filter values. `None` or `"all"` matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFilter {
    #[serde(default)]
    pub map: Option<String>,
    #[serde(default)]
    pub tournament: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

fn selects(filter: Option<&str>, value: impl FnOnce(&str) -> bool) -> bool {
    match filter {
        None | Some("all") => true,
        Some(wanted) => value(wanted),
    }
}

impl MatchFilter {
    #[must_use]
    pub fn matches(&self, m: &ProMatch) -> bool {
        selects(self.map.as_deref(), |v| m.map == v)
            && selects(self.tournament.as_deref(), |v| m.tournament == v)
            && selects(self.region.as_deref(), |v| m.involves_region(v))
    }
}

#[must_use]
pub fn filter_matches<'a>(matches: &'a [ProMatch], filter: &MatchFilter) -> Vec<&'a ProMatch> {
    matches.iter().filter(|m| filter.matches(m)).collect()
}

#[derive(Deserialize)]
struct MatchFile {
    matches: Vec<ProMatch>,
}

/// Parse a `{ "matches": [...] }` data file.
///
/// # Errors
///
/// Any JSON shape error.
pub fn load(json: &str) -> Result<Vec<ProMatch>, serde_json::Error> {
    serde_json::from_str::<MatchFile>(json).map(|f| f.matches)
}

#[cfg(test)]
#[path = "pro_matches_test.rs"]
mod tests;
