//! Team playbook helpers that sit around the ban/pick ceremony.
//!
//! Everything here is plain data plus pure functions. Storage, auth and
//! remote fetching belong to the caller.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`composition`] | Five-slot agent compositions, cost and attribute tallies |
//! | [`roster`] | Team roster with per-player agent pools |
//! | [`premier`] | Premier season schedule, points, linked comps, leaderboard |
//! | [`pro_matches`] | Pro match records and filtering |

pub mod composition;
pub mod premier;
pub mod pro_matches;
pub mod roster;
