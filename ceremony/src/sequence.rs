//! Ban/pick sequence generation.
//!
//! DESIGN
//! ======
//! A sequence is a pure function of (strategy, format, pool size, first
//! team). Its length always equals the pool size, so every map receives
//! exactly one action and no map is left over.
//!
//! Scaling strategy: alternating filler bans starting with the first team,
//! followed by a fixed per-format tail. The tail carries all picks, the
//! mid-series bans, and the trailing decider pick.
//!
//! Fixed strategy: the published per-format tables. The pool must match the
//! table length exactly.
//!
//! No strategy accepts more than [`MAX_POOL`] maps.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CeremonyError, ParseError};
use crate::format::Format;
use crate::team::Team;

/// Upper bound on pool size for every strategy and format.
pub const MAX_POOL: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Ban,
    Pick,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ban => "Ban",
            Self::Pick => "Pick",
        })
    }
}

/// One entry of a sequence: which team acts and how.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Step {
    pub kind: ActionKind,
    pub team: Team,
}

impl Step {
    #[must_use]
    pub const fn ban(team: Team) -> Self {
        Self { kind: ActionKind::Ban, team }
    }

    #[must_use]
    pub const fn pick(team: Team) -> Self {
        Self { kind: ActionKind::Pick, team }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.team)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceStrategy {
    #[default]
    Scaling,
    Fixed,
}

impl fmt::Display for SequenceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scaling => "scaling",
            Self::Fixed => "fixed",
        })
    }
}

impl FromStr for SequenceStrategy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scaling" => Ok(Self::Scaling),
            "fixed" => Ok(Self::Fixed),
            _ => Err(ParseError::Strategy(s.to_owned())),
        }
    }
}

impl SequenceStrategy {
    /// Smallest pool the strategy accepts for `format`.
    #[must_use]
    pub fn min_pool(self, format: Format) -> usize {
        match self {
            Self::Scaling => tail(format).len() + 1,
            Self::Fixed => table(format).len(),
        }
    }

    /// Largest pool the strategy accepts for `format`.
    #[must_use]
    pub fn max_pool(self, format: Format) -> usize {
        match self {
            Self::Scaling => MAX_POOL,
            Self::Fixed => table(format).len(),
        }
    }
}

// =============================================================================
// TABLES
// =============================================================================

#[derive(Clone, Copy)]
enum Seat {
    First,
    Second,
}

type Pattern = &'static [(ActionKind, Seat)];

use ActionKind::{Ban, Pick};
use Seat::{First, Second};

const BO1_TAIL: Pattern = &[(Pick, First)];
const BO2_TAIL: Pattern = &[(Pick, First), (Pick, Second), (Ban, First), (Ban, Second)];
const BO3_TAIL: Pattern = &[(Pick, First), (Pick, Second), (Ban, First), (Ban, Second), (Pick, First)];
const BO5_TAIL: Pattern = &[
    (Pick, First),
    (Pick, Second),
    (Pick, First),
    (Pick, Second),
    (Ban, First),
    (Ban, Second),
    (Pick, First),
];

const BO1_TABLE: Pattern = &[
    (Ban, First),
    (Ban, Second),
    (Ban, First),
    (Ban, Second),
    (Ban, First),
    (Ban, Second),
    (Pick, First),
];
const BO2_TABLE: Pattern = &[(Ban, First), (Ban, Second), (Pick, First), (Pick, Second), (Ban, First), (Ban, Second)];
const BO3_TABLE: Pattern = &[
    (Ban, First),
    (Ban, Second),
    (Pick, First),
    (Pick, Second),
    (Ban, First),
    (Ban, Second),
    (Pick, First),
];
const BO5_TABLE: Pattern = &[
    (Ban, First),
    (Ban, Second),
    (Pick, First),
    (Pick, Second),
    (Pick, First),
    (Pick, Second),
    (Ban, First),
    (Ban, Second),
    (Pick, First),
];

fn tail(format: Format) -> Pattern {
    match format {
        Format::Bo1 => BO1_TAIL,
        Format::Bo2 => BO2_TAIL,
        Format::Bo3 => BO3_TAIL,
        Format::Bo5 => BO5_TAIL,
    }
}

fn table(format: Format) -> Pattern {
    match format {
        Format::Bo1 => BO1_TABLE,
        Format::Bo2 => BO2_TABLE,
        Format::Bo3 => BO3_TABLE,
        Format::Bo5 => BO5_TABLE,
    }
}

// =============================================================================
// GENERATION
// =============================================================================

/// Check a pool size against the strategy bounds for `format`.
///
/// # Errors
///
/// `InsufficientMaps` below the minimum, `TooManyMaps` above the fixed table
/// length or [`MAX_POOL`].
pub fn validate_pool(strategy: SequenceStrategy, format: Format, pool_size: usize) -> Result<(), CeremonyError> {
    let required = strategy.min_pool(format);
    if pool_size < required {
        return Err(CeremonyError::InsufficientMaps { format, required, actual: pool_size });
    }
    let maximum = strategy.max_pool(format);
    if pool_size > maximum {
        return Err(CeremonyError::TooManyMaps { format, maximum, actual: pool_size });
    }
    Ok(())
}

/// Produce the full action sequence for a ceremony.
///
/// # Errors
///
/// Returns the [`validate_pool`] error when the pool size is out of bounds.
pub fn generate_sequence(
    strategy: SequenceStrategy,
    format: Format,
    pool_size: usize,
    first: Team,
) -> Result<Vec<Step>, CeremonyError> {
    validate_pool(strategy, format, pool_size)?;

    let seat = |seat: Seat| match seat {
        First => first,
        Second => first.opponent(),
    };
    let resolve = |&(kind, s): &(ActionKind, Seat)| Step { kind, team: seat(s) };

    let sequence = match strategy {
        SequenceStrategy::Fixed => table(format).iter().map(resolve).collect(),
        SequenceStrategy::Scaling => {
            let tail = tail(format);
            let filler = pool_size - tail.len();
            (0..filler)
                .map(|i| Step::ban(if i % 2 == 0 { first } else { first.opponent() }))
                .chain(tail.iter().map(resolve))
                .collect()
        }
    };
    Ok(sequence)
}

#[cfg(test)]
#[path = "sequence_test.rs"]
mod tests;
