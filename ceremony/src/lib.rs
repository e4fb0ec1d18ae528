//! Map ban/pick ceremony engine.
//!
//! Pool validation, sequence generation, turn derivation, side selection,
//! the coin toss, and the running summary. No I/O; the server and the CLI
//! drive the same state machine.
//!
//! The progress pointer is never stored. Every query recomputes it from the
//! map states.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`format`] | Best-of formats |
//! | [`pool`] | Validated map pools and catalog selection |
//! | [`sequence`] | Scaling and fixed ban/pick sequences |
//! | [`map`] | Per-map status and sides |
//! | [`engine`] | Derived cursor, ban/pick/side transitions, summary |
//! | [`toss`] | Coin faces, uniform and streak-biased flips |
//! | [`session`] | Setup → toss → order → ban/pick stage machine |
//! | [`team`] | Team ids and display names |
//! | [`error`] | `CeremonyError` and `IllegalAction` |

pub mod engine;
pub mod error;
pub mod format;
pub mod map;
pub mod pool;
pub mod sequence;
pub mod session;
pub mod team;
pub mod toss;

pub use engine::{Ceremony, PickEntry, StepCursor, Summary, Turn, current_step, pending_side, summarize};
pub use error::{CeremonyError, IllegalAction, ParseError};
pub use format::Format;
pub use map::{MapState, MapStatus, Side};
pub use pool::{COMPETITIVE_POOL, MapPool, PoolSelection};
pub use sequence::{ActionKind, MAX_POOL, SequenceStrategy, Step, generate_sequence, validate_pool};
pub use session::{MatchSetup, Session, SessionView, StageKind};
pub use team::{Team, TeamNames};
pub use toss::{CoinFlipper, Face, TossPolicy, TossResult, resolve_toss};
