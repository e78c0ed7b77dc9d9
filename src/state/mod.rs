/// Online/offline gate.
pub mod connectivity;
/// Local-first synchronised collection.
pub mod local_remote;
mod sse;
/// Backend handle and retry policies shared by the collections.
pub mod sync_context;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::{
    config::AppConfig,
    dao::{
        local_cache::{CacheResult, LocalCache},
        models::{Player, Schedule, TeamConfig},
    },
};

pub use self::connectivity::{ConnectivityGate, Transition};
pub use self::local_remote::{
    Deleted, LocalRemoteStore, PushOutcome, ReconcileSummary, RecordKey, RemoteDeletion,
    SweepFailure, SweepReport,
};
pub use self::sse::SseHub;
pub use self::sync_context::SyncContext;

/// Handle shared with every handler and background task.
pub type SharedState = Arc<AppState>;

const SSE_CAPACITY: usize = 64;

/// Central application state: the three synchronised collections and the
/// connectivity plumbing they share.
pub struct AppState {
    players: LocalRemoteStore<Player>,
    schedules: LocalRemoteStore<Schedule>,
    team_configs: LocalRemoteStore<TeamConfig>,
    sync: Arc<SyncContext>,
    sse: SseHub,
    config: AppConfig,
    sweep_gate: Mutex<()>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The gate starts offline until the storage supervisor reaches a backend.
    pub fn new(config: AppConfig, cache: Arc<dyn LocalCache>) -> SharedState {
        let sync = Arc::new(SyncContext::from_config(&config));
        Arc::new(Self {
            players: LocalRemoteStore::new(cache.clone(), sync.clone()),
            schedules: LocalRemoteStore::new(cache.clone(), sync.clone()),
            team_configs: LocalRemoteStore::new(cache, sync.clone()),
            sync,
            sse: SseHub::new(SSE_CAPACITY),
            config,
            sweep_gate: Mutex::new(()),
        })
    }

    /// Restore every collection from the local cache.
    pub fn load_caches(&self) -> CacheResult<()> {
        let players = self.players.load()?;
        let schedules = self.schedules.load()?;
        let team_configs = self.team_configs.load()?;
        info!(players, schedules, team_configs, "local caches loaded");
        Ok(())
    }

    /// Roster collection.
    pub fn players(&self) -> &LocalRemoteStore<Player> {
        &self.players
    }

    /// Schedule collection.
    pub fn schedules(&self) -> &LocalRemoteStore<Schedule> {
        &self.schedules
    }

    /// Team config collection.
    pub fn team_configs(&self) -> &LocalRemoteStore<TeamConfig> {
        &self.team_configs
    }

    /// Gate, installed backend and retry policies shared by the stores.
    pub fn sync(&self) -> &SyncContext {
        &self.sync
    }

    /// Connectivity gate shared by every collection.
    pub fn gate(&self) -> &ConnectivityGate {
        self.sync.gate()
    }

    /// Broadcast hub used for the change stream.
    pub fn sse(&self) -> &SseHub {
        &self.sse
    }

    /// Configuration loaded at startup.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Serialises reconnect sweeps so two transitions never sweep concurrently.
    pub fn sweep_gate(&self) -> &Mutex<()> {
        &self.sweep_gate
    }
}
