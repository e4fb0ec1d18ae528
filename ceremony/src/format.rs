//! Series formats.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Best-of series format. Fixes both the minimum pool and the sequence shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Bo1,
    Bo2,
    Bo3,
    Bo5,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Bo1, Format::Bo2, Format::Bo3, Format::Bo5];

    /// Number of maps played in the series.
    #[must_use]
    pub fn games(self) -> usize {
        match self {
            Self::Bo1 => 1,
            Self::Bo2 => 2,
            Self::Bo3 => 3,
            Self::Bo5 => 5,
        }
    }

    /// Odd series end on a single decider map.
    #[must_use]
    pub fn has_decider(self) -> bool {
        self.games() % 2 == 1
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bo1 => "bo1",
            Self::Bo2 => "bo2",
            Self::Bo3 => "bo3",
            Self::Bo5 => "bo5",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bo{}", self.games())
    }
}

impl FromStr for Format {
    type Err = ParseError;

    /// Accepts `bo3`, `Bo3`, `BO3` and the bare `3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let digits = lowered.strip_prefix("bo").unwrap_or(&lowered);
        match digits {
            "1" => Ok(Self::Bo1),
            "2" => Ok(Self::Bo2),
            "3" => Ok(Self::Bo3),
            "5" => Ok(Self::Bo5),
            _ => Err(ParseError::Format(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[path = "format_test.rs"]
mod tests;
