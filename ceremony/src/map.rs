//! Per-map ceremony state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::team::Team;

/// Lifecycle of a map. Leaves `Available` exactly once and never reverts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapStatus {
    Available,
    Banned,
    Picked,
}

impl fmt::Display for MapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Available => "available",
            Self::Banned => "banned",
            Self::Picked => "picked",
        })
    }
}

/// Starting role on a picked map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Attack,
    Defense,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Attack => "attack",
            Self::Defense => "defense",
        })
    }
}

impl FromStr for Side {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attack" | "atk" => Ok(Self::Attack),
            "defense" | "defence" | "def" => Ok(Self::Defense),
            _ => Err(ParseError::Side(s.to_owned())),
        }
    }
}

/// One map in the pool.
///
/// `team` is the team that banned or picked the map. `side` is only ever
/// set on picked maps, by the opponent of `team`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapState {
    pub name: String,
    pub status: MapStatus,
    pub team: Option<Team>,
    pub side: Option<Side>,
}

impl MapState {
    #[must_use]
    pub fn available(name: impl Into<String>) -> Self {
        Self { name: name.into(), status: MapStatus::Available, team: None, side: None }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == MapStatus::Available
    }

    /// Picked, but the opponent has not chosen a side yet.
    #[must_use]
    pub fn awaiting_side(&self) -> bool {
        self.status == MapStatus::Picked && self.side.is_none()
    }
}
