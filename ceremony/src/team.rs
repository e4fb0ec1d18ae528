//! The two sides of a ceremony.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

pub const DEFAULT_TEAM_A: &str = "Team A";
pub const DEFAULT_TEAM_B: &str = "Team B";

/// Team identifier. Serialized as `0` or `1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Team {
    A,
    B,
}

impl Team {
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    #[must_use]
    pub fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl From<Team> for u8 {
    fn from(team: Team) -> Self {
        match team {
            Team::A => 0,
            Team::B => 1,
        }
    }
}

impl TryFrom<u8> for Team {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::A),
            1 => Ok(Self::B),
            other => Err(ParseError::Team(other.to_string())),
        }
    }
}

impl FromStr for Team {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "a" => Ok(Self::A),
            "1" | "b" => Ok(Self::B),
            _ => Err(ParseError::Team(s.to_owned())),
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Display names for both teams. Blank names fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamNames {
    pub a: String,
    pub b: String,
}

impl TeamNames {
    #[must_use]
    pub fn new(a: &str, b: &str) -> Self {
        Self { a: name_or(a, DEFAULT_TEAM_A), b: name_or(b, DEFAULT_TEAM_B) }
    }

    #[must_use]
    pub fn name(&self, team: Team) -> &str {
        match team {
            Team::A => &self.a,
            Team::B => &self.b,
        }
    }
}

impl Default for TeamNames {
    fn default() -> Self {
        Self::new("", "")
    }
}

fn name_or(raw: &str, fallback: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() { fallback.to_owned() } else { trimmed.to_owned() }
}
