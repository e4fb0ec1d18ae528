//! Domain services used by websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own session state, fan-out, and archiving so route
//! handlers only translate between HTTP or frames and service calls.

pub mod ceremony;
pub mod persistence;
