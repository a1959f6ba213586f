use skymed_domain::EntropyDrain;
use skymed_fleet::{DrainReport, DrainSimulator, FleetReporter, FleetService, LoadCoordinator};
use skymed_store::{FleetStore, StoreError};
use std::sync::Arc;

use crate::config::Config;

pub struct AppState {
    pub config: Config,
    pub fleet: FleetService,
    pub loader: LoadCoordinator,
    pub simulator: DrainSimulator,
    pub reporter: FleetReporter,
}

impl AppState {
    /// Open the store once at process start and hand the shared handle to
    /// every component; it closes on drop at shutdown.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store = Arc::new(FleetStore::open(&config.database_path)?);

        Ok(AppState {
            fleet: FleetService::new(store.clone()),
            loader: LoadCoordinator::new(store.clone(), config.strict_loading),
            simulator: DrainSimulator::new(store.clone(), Box::new(EntropyDrain::new())),
            reporter: FleetReporter::new(store),
            config,
        })
    }

    /// Run one drain cycle on the blocking pool
    ///
    /// The whole-fleet batch holds the store connection while it runs, so it
    /// must not occupy an async worker thread.
    pub async fn run_drain_cycle(self: &Arc<Self>) -> skymed_fleet::Result<DrainReport> {
        let state = Arc::clone(self);
        let report = tokio::task::spawn_blocking(move || state.simulator.run_tick())
            .await
            .map_err(|e| StoreError::Unavailable(format!("drain task failed: {e}")))??;
        Ok(report)
    }
}
