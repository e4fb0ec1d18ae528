//! Error taxonomy for the ceremony engine.
//!
//! Every error here is local and recoverable. A rejected call never mutates
//! state, so callers can surface the message and keep going.

use crate::format::Format;
use crate::map::MapStatus;
use crate::session::StageKind;
use crate::team::Team;

/// Error returned by validation and state transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CeremonyError {
    /// The pool is below the format minimum. Carries the minimum so the
    /// caller can prompt for more maps.
    #[error("{format} needs at least {required} maps, got {actual}")]
    InsufficientMaps { format: Format, required: usize, actual: usize },
    /// The pool is above the strategy maximum for the format.
    #[error("{format} accepts at most {maximum} maps, got {actual}")]
    TooManyMaps { format: Format, maximum: usize, actual: usize },
    #[error("map listed twice in pool: {0}")]
    DuplicateMap(String),
    #[error("map name must not be blank")]
    EmptyMapName,
    #[error("illegal action: {0}")]
    IllegalAction(#[from] IllegalAction),
}

/// Reason an action was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IllegalAction {
    #[error("map is not in the pool: {0}")]
    UnknownMap(String),
    #[error("{map} is already {status}")]
    MapUnavailable { map: String, status: MapStatus },
    #[error("ceremony is already complete")]
    CeremonyComplete,
    #[error("team {team} must choose a side for {map} first")]
    AwaitingSide { map: String, team: Team },
    #[error("no side choice is pending for {0}")]
    SideNotPending(String),
    #[error("expected stage {expected}, session is in {actual}")]
    WrongStage { expected: StageKind, actual: StageKind },
    #[error("no calling team has been nominated")]
    NoCaller,
}

/// Error returned when parsing a user-supplied token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown format: {0} (expected bo1, bo2, bo3 or bo5)")]
    Format(String),
    #[error("unknown team: {0} (expected 0 or 1)")]
    Team(String),
    #[error("unknown side: {0} (expected attack or defense)")]
    Side(String),
    #[error("unknown coin face: {0} (expected heads or tails)")]
    Face(String),
    #[error("unknown sequence strategy: {0} (expected scaling or fixed)")]
    Strategy(String),
    #[error("unknown toss policy: {0} (expected uniform or streak_biased)")]
    Policy(String),
}
