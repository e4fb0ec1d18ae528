//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the live ceremony sessions, each with its subscribed clients, plus
//! the map catalog, the coin drawer, and the persistence queue.
//!
//! The coin drawer sits behind a plain mutex: a draw never awaits, and the
//! streak history is shared by every ceremony on this server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use ceremony::{CoinFlipper, Face, Session};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::catalog::MapCatalog;
use crate::config::AppConfig;
use crate::frame::Frame;
use crate::services::persistence::FinishedCeremony;

// =============================================================================
// CEREMONY STATE
// =============================================================================

/// One live session and the clients watching it.
pub struct CeremonyState {
    pub session: Session,
    /// `client_id` -> sender for outgoing frames.
    pub clients: HashMap<Uuid, mpsc::Sender<Frame>>,
}

impl CeremonyState {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self { session, clients: HashMap::new() }
    }
}

// =============================================================================
// COIN DRAWER
// =============================================================================

pub struct CoinDrawer {
    flipper: CoinFlipper,
    rng: StdRng,
}

impl CoinDrawer {
    #[must_use]
    pub fn new(flipper: CoinFlipper, rng: StdRng) -> Self {
        Self { flipper, rng }
    }

    pub fn draw(&mut self) -> Face {
        self.flipper.flip(&mut self.rng)
    }
}

// =============================================================================
// APP STATE
// =============================================================================

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub ceremonies: Arc<RwLock<HashMap<Uuid, CeremonyState>>>,
    pub catalog: Arc<dyn MapCatalog>,
    pub drawer: Arc<Mutex<CoinDrawer>>,
    /// `None` when no database is configured.
    pub persist_tx: Option<mpsc::Sender<FinishedCeremony>>,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: AppConfig,
        catalog: Arc<dyn MapCatalog>,
        persist_tx: Option<mpsc::Sender<FinishedCeremony>>,
    ) -> Self {
        let drawer = CoinDrawer::new(CoinFlipper::new(config.toss_policy), StdRng::from_os_rng());
        Self {
            config: Arc::new(config),
            ceremonies: Arc::new(RwLock::new(HashMap::new())),
            catalog,
            drawer: Arc::new(Mutex::new(drawer)),
            persist_tx,
        }
    }

    /// Draw one coin face under the configured policy.
    #[must_use]
    pub fn draw_face(&self) -> Face {
        self.drawer.lock().unwrap_or_else(PoisonError::into_inner).draw()
    }
}
