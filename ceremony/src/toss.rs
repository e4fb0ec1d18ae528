//! Coin toss that fixes the first team.
//!
//! DESIGN
//! ======
//! Resolution is pure: the caller wins iff its call matches the drawn face.
//! Drawing is separate and pluggable so the fairness policy stays a
//! configuration choice.
//!
//! `StreakBiased` keeps a rolling window of recent faces and weights the next
//! draw toward whichever face has shown up less, using a Laplace-smoothed
//! ratio: `P(heads) = (tails + 1) / (window_len + 2)`. An empty history gives
//! exactly one half.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::team::Team;

pub const DEFAULT_STREAK_WINDOW: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    Heads,
    Tails,
}

impl Face {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Heads => Self::Tails,
            Self::Tails => Self::Heads,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Heads => "heads",
            Self::Tails => "tails",
        })
    }
}

impl FromStr for Face {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heads" | "h" => Ok(Self::Heads),
            "tails" | "t" => Ok(Self::Tails),
            _ => Err(ParseError::Face(s.to_owned())),
        }
    }
}

/// Outcome of a resolved toss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TossResult {
    pub calling: Team,
    pub call: Face,
    pub drawn: Face,
    pub winner: Team,
}

impl TossResult {
    /// Team that acts first given the winner's order choice.
    #[must_use]
    pub fn first_team(&self, winner_goes_first: bool) -> Team {
        if winner_goes_first { self.winner } else { self.winner.opponent() }
    }
}

#[must_use]
pub fn resolve_toss(calling: Team, call: Face, drawn: Face) -> TossResult {
    let winner = if call == drawn { calling } else { calling.opponent() };
    TossResult { calling, call, drawn, winner }
}

// =============================================================================
// POLICY
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum TossPolicy {
    #[default]
    Uniform,
    StreakBiased { window: usize },
}

impl TossPolicy {
    /// Build a policy from its config name and window size.
    ///
    /// # Errors
    ///
    /// `ParseError::Policy` for an unrecognized name.
    pub fn parse(name: &str, window: usize) -> Result<Self, ParseError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(Self::Uniform),
            "streak_biased" | "streak-biased" => Ok(Self::StreakBiased { window }),
            _ => Err(ParseError::Policy(name.to_owned())),
        }
    }
}

impl fmt::Display for TossPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform => f.write_str("uniform"),
            Self::StreakBiased { window } => write!(f, "streak_biased(window={window})"),
        }
    }
}

/// Draws coin faces under a policy. History is shared across every toss made
/// through the same flipper.
#[derive(Clone, Debug)]
pub struct CoinFlipper {
    policy: TossPolicy,
    history: VecDeque<Face>,
}

impl CoinFlipper {
    #[must_use]
    pub fn new(policy: TossPolicy) -> Self {
        Self { policy, history: VecDeque::new() }
    }

    #[must_use]
    pub fn policy(&self) -> TossPolicy {
        self.policy
    }

    pub fn history(&self) -> impl Iterator<Item = Face> + '_ {
        self.history.iter().copied()
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn heads_probability(&self) -> f64 {
        match self.policy {
            TossPolicy::Uniform => 0.5,
            TossPolicy::StreakBiased { .. } => {
                let tails = self.history.iter().filter(|&&f| f == Face::Tails).count();
                (tails as f64 + 1.0) / (self.history.len() as f64 + 2.0)
            }
        }
    }

    pub fn flip<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Face {
        let face = if rng.random_bool(self.heads_probability()) { Face::Heads } else { Face::Tails };
        self.record(face);
        face
    }

    fn record(&mut self, face: Face) {
        let TossPolicy::StreakBiased { window } = self.policy else { return };
        if window == 0 {
            return;
        }
        self.history.push_back(face);
        while self.history.len() > window {
            self.history.pop_front();
        }
    }
}

#[cfg(test)]
#[path = "toss_test.rs"]
mod tests;
