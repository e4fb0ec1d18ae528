//! Ceremony state machine: turn derivation, actions, summary.
//!
//! DESIGN
//! ======
//! State is the pool of map states plus the generated sequence. Nothing
//! else is stored: the step index is the number of maps that have left
//! `Available`, and a pending side choice is any picked map without a side.
//! Both are recomputed on every query.
//!
//! A pick blocks further map actions until the opponent records a side.
//! A ceremony is complete once the sequence is exhausted and no side choice
//! remains outstanding, which includes the decider.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CeremonyError, IllegalAction};
use crate::format::Format;
use crate::map::{MapState, MapStatus, Side};
use crate::pool::MapPool;
use crate::sequence::{ActionKind, SequenceStrategy, Step, generate_sequence};
use crate::team::{Team, TeamNames};

// =============================================================================
// DERIVATIONS
// =============================================================================

/// Position in the sequence derived from map states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepCursor {
    Pending { index: usize, step: Step },
    Complete,
}

/// Step due next, or `Complete` when every step has been consumed.
#[must_use]
pub fn current_step(maps: &[MapState], sequence: &[Step]) -> StepCursor {
    let index = maps.iter().filter(|m| !m.is_available()).count();
    sequence.get(index).map_or(StepCursor::Complete, |&step| StepCursor::Pending { index, step })
}

/// Picked map still waiting on a side choice.
#[must_use]
pub fn pending_side(maps: &[MapState]) -> Option<&MapState> {
    maps.iter().find(|m| m.awaiting_side())
}

/// What the presentation layer should prompt for next.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Turn {
    Act { index: usize, team: Team, kind: ActionKind },
    ChooseSide { map: String, team: Team },
    Complete,
}

impl Turn {
    /// Human-readable prompt using team display names.
    #[must_use]
    pub fn describe(&self, names: &TeamNames) -> String {
        match self {
            Self::Act { team, kind, .. } => format!("{}: {kind}", names.name(*team)),
            Self::ChooseSide { map, team } => format!("{}: choose side on {map}", names.name(*team)),
            Self::Complete => "Complete".to_owned(),
        }
    }
}

fn turn_for(maps: &[MapState], sequence: &[Step]) -> Turn {
    if let Some(map) = pending_side(maps) {
        if let Some(picker) = map.team {
            return Turn::ChooseSide { map: map.name.clone(), team: picker.opponent() };
        }
    }
    match current_step(maps, sequence) {
        StepCursor::Pending { index, step } => Turn::Act { index, team: step.team, kind: step.kind },
        StepCursor::Complete => Turn::Complete,
    }
}

// =============================================================================
// SUMMARY
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickEntry {
    pub map: String,
    pub side: Option<Side>,
}

impl fmt::Display for PickEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.side {
            Some(side) => write!(f, "{} ({side})", self.map),
            None => f.write_str(&self.map),
        }
    }
}

/// Bans and picks per team, in pool order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub team_a_bans: Vec<String>,
    pub team_a_picks: Vec<PickEntry>,
    pub team_b_bans: Vec<String>,
    pub team_b_picks: Vec<PickEntry>,
}

impl Summary {
    #[must_use]
    pub fn bans(&self, team: Team) -> &[String] {
        match team {
            Team::A => &self.team_a_bans,
            Team::B => &self.team_b_bans,
        }
    }

    #[must_use]
    pub fn picks(&self, team: Team) -> &[PickEntry] {
        match team {
            Team::A => &self.team_a_picks,
            Team::B => &self.team_b_picks,
        }
    }
}

/// Partition map states by team and action. Available maps are skipped.
#[must_use]
pub fn summarize(maps: &[MapState]) -> Summary {
    let mut summary = Summary::default();
    for map in maps {
        let Some(team) = map.team else { continue };
        match (map.status, team) {
            (MapStatus::Banned, Team::A) => summary.team_a_bans.push(map.name.clone()),
            (MapStatus::Banned, Team::B) => summary.team_b_bans.push(map.name.clone()),
            (MapStatus::Picked, Team::A) => summary.team_a_picks.push(PickEntry { map: map.name.clone(), side: map.side }),
            (MapStatus::Picked, Team::B) => summary.team_b_picks.push(PickEntry { map: map.name.clone(), side: map.side }),
            (MapStatus::Available, _) => {}
        }
    }
    summary
}

// =============================================================================
// CEREMONY
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ceremony {
    format: Format,
    strategy: SequenceStrategy,
    first: Team,
    sequence: Vec<Step>,
    maps: Vec<MapState>,
}

impl Ceremony {
    /// Validate the pool and generate the sequence.
    ///
    /// # Errors
    ///
    /// Pool size errors from sequence generation.
    pub fn new(strategy: SequenceStrategy, format: Format, pool: &MapPool, first: Team) -> Result<Self, CeremonyError> {
        let sequence = generate_sequence(strategy, format, pool.len(), first)?;
        let maps = pool.names().iter().map(MapState::available).collect();
        Ok(Self { format, strategy, first, sequence, maps })
    }

    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    #[must_use]
    pub fn strategy(&self) -> SequenceStrategy {
        self.strategy
    }

    #[must_use]
    pub fn first(&self) -> Team {
        self.first
    }

    #[must_use]
    pub fn sequence(&self) -> &[Step] {
        &self.sequence
    }

    #[must_use]
    pub fn maps(&self) -> &[MapState] {
        &self.maps
    }

    #[must_use]
    pub fn current_step(&self) -> StepCursor {
        current_step(&self.maps, &self.sequence)
    }

    #[must_use]
    pub fn turn(&self) -> Turn {
        turn_for(&self.maps, &self.sequence)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.turn() == Turn::Complete
    }

    #[must_use]
    pub fn summary(&self) -> Summary {
        summarize(&self.maps)
    }

    /// Ban or pick `map` for the team whose step is current.
    ///
    /// # Errors
    ///
    /// `IllegalAction` when a side choice is outstanding, the ceremony is
    /// complete, or the map is unknown or already used. State is untouched.
    pub fn apply_ban_or_pick(&mut self, map: &str) -> Result<Turn, CeremonyError> {
        let map = map.trim();
        if let Some(pending) = pending_side(&self.maps) {
            let team = pending.team.map_or(self.first, Team::opponent);
            return Err(IllegalAction::AwaitingSide { map: pending.name.clone(), team }.into());
        }
        let StepCursor::Pending { step, .. } = self.current_step() else {
            return Err(IllegalAction::CeremonyComplete.into());
        };

        let slot = self
            .maps
            .iter_mut()
            .find(|m| m.name == map)
            .ok_or_else(|| IllegalAction::UnknownMap(map.to_owned()))?;
        if !slot.is_available() {
            return Err(IllegalAction::MapUnavailable { map: slot.name.clone(), status: slot.status }.into());
        }

        slot.status = match step.kind {
            ActionKind::Ban => MapStatus::Banned,
            ActionKind::Pick => MapStatus::Picked,
        };
        slot.team = Some(step.team);
        Ok(self.turn())
    }

    /// Record the opponent's side choice on the pending pick.
    ///
    /// # Errors
    ///
    /// `IllegalAction` when `map` is unknown or has no side choice pending.
    pub fn apply_side(&mut self, map: &str, side: Side) -> Result<Turn, CeremonyError> {
        let map = map.trim();
        let slot = self
            .maps
            .iter_mut()
            .find(|m| m.name == map)
            .ok_or_else(|| IllegalAction::UnknownMap(map.to_owned()))?;
        if !slot.awaiting_side() {
            return Err(IllegalAction::SideNotPending(slot.name.clone()).into());
        }
        slot.side = Some(side);
        Ok(self.turn())
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
