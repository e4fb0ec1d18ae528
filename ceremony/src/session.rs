//! Session: the full stage machine from setup to a finished ceremony.
//!
//! DESIGN
//! ======
//! ```text
//! Setup ──start──▶ CoinToss ──record_toss──▶ OrderChoice ──choose_order──▶ BanPick
//!   ▲                                                                        │
//!   └───────────────────────────────── reset ────────────────────────────────┘
//! ```
//!
//! Each stage owns exactly the data it needs, so a reset replaces the whole
//! value in one assignment and no field can outlive its stage.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::{Ceremony, Summary, Turn};
use crate::error::{CeremonyError, IllegalAction};
use crate::format::Format;
use crate::map::{MapState, Side};
use crate::pool::MapPool;
use crate::sequence::{SequenceStrategy, Step, validate_pool};
use crate::team::{Team, TeamNames};
use crate::toss::{Face, TossResult, resolve_toss};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Setup,
    CoinToss,
    OrderChoice,
    BanPick,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setup => "setup",
            Self::CoinToss => "coin_toss",
            Self::OrderChoice => "order_choice",
            Self::BanPick => "ban_pick",
        })
    }
}

/// Everything chosen before the toss.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSetup {
    pub format: Format,
    #[serde(default)]
    pub strategy: SequenceStrategy,
    #[serde(default)]
    pub teams: TeamNames,
    pub pool: MapPool,
}

impl MatchSetup {
    /// # Errors
    ///
    /// Pool size errors for the chosen strategy and format.
    pub fn validate(&self) -> Result<(), CeremonyError> {
        validate_pool(self.strategy, self.format, self.pool.len())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Stage {
    Setup,
    CoinToss { setup: MatchSetup, calling: Option<Team> },
    OrderChoice { setup: MatchSetup, toss: TossResult },
    BanPick { setup: MatchSetup, toss: TossResult, ceremony: Ceremony },
}

impl Stage {
    fn kind(&self) -> StageKind {
        match self {
            Self::Setup => StageKind::Setup,
            Self::CoinToss { .. } => StageKind::CoinToss,
            Self::OrderChoice { .. } => StageKind::OrderChoice,
            Self::BanPick { .. } => StageKind::BanPick,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    stage: Stage,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self { stage: Stage::Setup }
    }

    #[must_use]
    pub fn stage(&self) -> StageKind {
        self.stage.kind()
    }

    fn wrong_stage(&self, expected: StageKind) -> CeremonyError {
        IllegalAction::WrongStage { expected, actual: self.stage() }.into()
    }

    /// Validate the setup and move to the coin toss.
    ///
    /// # Errors
    ///
    /// `WrongStage` outside setup, or a pool size error.
    pub fn start(&mut self, setup: MatchSetup) -> Result<(), CeremonyError> {
        if !matches!(self.stage, Stage::Setup) {
            return Err(self.wrong_stage(StageKind::Setup));
        }
        setup.validate()?;
        self.stage = Stage::CoinToss { setup, calling: None };
        Ok(())
    }

    /// Nominate the team that calls the coin. May be changed until the toss.
    ///
    /// # Errors
    ///
    /// `WrongStage` outside the coin toss.
    pub fn nominate_caller(&mut self, team: Team) -> Result<(), CeremonyError> {
        if let Stage::CoinToss { calling, .. } = &mut self.stage {
            *calling = Some(team);
            return Ok(());
        }
        Err(self.wrong_stage(StageKind::CoinToss))
    }

    /// Resolve the toss against a drawn face.
    ///
    /// # Errors
    ///
    /// `WrongStage` outside the coin toss, `NoCaller` before a nomination.
    pub fn record_toss(&mut self, call: Face, drawn: Face) -> Result<TossResult, CeremonyError> {
        self.toss_with(call, || drawn)
    }

    /// Like [`Session::record_toss`], but the face is drawn only once the
    /// stage and caller have been checked. A rejected toss never draws.
    ///
    /// # Errors
    ///
    /// `WrongStage` outside the coin toss, `NoCaller` before a nomination.
    pub fn toss_with(&mut self, call: Face, draw: impl FnOnce() -> Face) -> Result<TossResult, CeremonyError> {
        let Stage::CoinToss { setup, calling } = &self.stage else {
            return Err(self.wrong_stage(StageKind::CoinToss));
        };
        let Some(calling) = *calling else {
            return Err(IllegalAction::NoCaller.into());
        };
        let toss = resolve_toss(calling, call, draw());
        self.stage = Stage::OrderChoice { setup: setup.clone(), toss };
        Ok(toss)
    }

    /// Apply the toss winner's choice and generate the sequence.
    ///
    /// # Errors
    ///
    /// `WrongStage` outside the order choice.
    pub fn choose_order(&mut self, winner_goes_first: bool) -> Result<Turn, CeremonyError> {
        let Stage::OrderChoice { setup, toss } = &self.stage else {
            return Err(self.wrong_stage(StageKind::OrderChoice));
        };
        let first = toss.first_team(winner_goes_first);
        let ceremony = Ceremony::new(setup.strategy, setup.format, &setup.pool, first)?;
        let turn = ceremony.turn();
        self.stage = Stage::BanPick { setup: setup.clone(), toss: *toss, ceremony };
        Ok(turn)
    }

    fn ceremony_mut(&mut self) -> Result<&mut Ceremony, CeremonyError> {
        let actual = self.stage();
        match &mut self.stage {
            Stage::BanPick { ceremony, .. } => Ok(ceremony),
            _ => Err(IllegalAction::WrongStage { expected: StageKind::BanPick, actual }.into()),
        }
    }

    /// # Errors
    ///
    /// `WrongStage` outside ban/pick, or the engine's `IllegalAction`.
    pub fn apply_ban_or_pick(&mut self, map: &str) -> Result<Turn, CeremonyError> {
        self.ceremony_mut()?.apply_ban_or_pick(map)
    }

    /// # Errors
    ///
    /// `WrongStage` outside ban/pick, or the engine's `IllegalAction`.
    pub fn apply_side(&mut self, map: &str, side: Side) -> Result<Turn, CeremonyError> {
        self.ceremony_mut()?.apply_side(map, side)
    }

    #[must_use]
    pub fn ceremony(&self) -> Option<&Ceremony> {
        match &self.stage {
            Stage::BanPick { ceremony, .. } => Some(ceremony),
            _ => None,
        }
    }

    #[must_use]
    pub fn setup(&self) -> Option<&MatchSetup> {
        match &self.stage {
            Stage::Setup => None,
            Stage::CoinToss { setup, .. } | Stage::OrderChoice { setup, .. } | Stage::BanPick { setup, .. } => {
                Some(setup)
            }
        }
    }

    #[must_use]
    pub fn toss(&self) -> Option<TossResult> {
        match &self.stage {
            Stage::OrderChoice { toss, .. } | Stage::BanPick { toss, .. } => Some(*toss),
            _ => None,
        }
    }

    #[must_use]
    pub fn turn(&self) -> Option<Turn> {
        self.ceremony().map(Ceremony::turn)
    }

    /// Running summary. Legal mid-ceremony; reflects partial data.
    ///
    /// # Errors
    ///
    /// `WrongStage` before ban/pick starts.
    pub fn summary(&self) -> Result<Summary, CeremonyError> {
        self.ceremony().map(Ceremony::summary).ok_or_else(|| self.wrong_stage(StageKind::BanPick))
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.ceremony().is_some_and(Ceremony::is_complete)
    }

    /// Clear pool, sequence, map states and toss together.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        let setup = self.setup();
        let ceremony = self.ceremony();
        let calling = match &self.stage {
            Stage::CoinToss { calling, .. } => *calling,
            Stage::OrderChoice { toss, .. } | Stage::BanPick { toss, .. } => Some(toss.calling),
            Stage::Setup => None,
        };
        let maps = match (ceremony, setup) {
            (Some(c), _) => c.maps().to_vec(),
            (None, Some(s)) => s.pool.names().iter().map(MapState::available).collect(),
            (None, None) => Vec::new(),
        };

        SessionView {
            stage: self.stage(),
            format: setup.map(|s| s.format),
            strategy: setup.map(|s| s.strategy),
            teams: setup.map(|s| s.teams.clone()),
            calling,
            toss: self.toss(),
            first: ceremony.map(Ceremony::first),
            sequence: ceremony.map(|c| c.sequence().to_vec()).unwrap_or_default(),
            maps,
            turn: self.turn(),
            summary: ceremony.map(Ceremony::summary),
            complete: self.is_complete(),
        }
    }
}

/// Serializable snapshot for clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub stage: StageKind,
    pub format: Option<Format>,
    pub strategy: Option<SequenceStrategy>,
    pub teams: Option<TeamNames>,
    pub calling: Option<Team>,
    pub toss: Option<TossResult>,
    pub first: Option<Team>,
    pub sequence: Vec<Step>,
    pub maps: Vec<MapState>,
    pub turn: Option<Turn>,
    pub summary: Option<Summary>,
    pub complete: bool,
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
