use std::sync::Arc;

use tokio::time::Duration;

use crate::ai::{CommentaryService, GeminiClient, TextModel};
use crate::catalog::PerkCatalog;
use crate::config::AppConfig;
use crate::ledger::Ledger;
use crate::models::{DashboardIdentity, UserIdentity};
use crate::session::SessionStore;
use crate::simulation::SimulationEngine;
use crate::websocket::ConnectionManager;

/// Gateway application state (shared).
///
/// User and dashboard sessions live in separate stores so a dashboard
/// token can never authorize a user route, and vice versa.
pub struct AppState {
    pub user_sessions: SessionStore<UserIdentity>,
    pub dashboard_sessions: SessionStore<DashboardIdentity>,
    pub ledger: Arc<Ledger>,
    pub catalog: Arc<PerkCatalog>,
    pub simulation: Arc<SimulationEngine>,
    pub ws_manager: Arc<ConnectionManager>,
    pub commentary: Arc<CommentaryService>,
}

impl AppState {
    /// Wire the full service graph from config.
    pub fn from_config(config: &AppConfig) -> Self {
        let model: Arc<dyn TextModel> = Arc::new(GeminiClient::from_config(&config.ai));
        Self::with_model(config, model)
    }

    /// Same graph with the AI upstream swapped out (tests stub it here).
    pub fn with_model(config: &AppConfig, model: Arc<dyn TextModel>) -> Self {
        let ledger = Arc::new(Ledger::new());
        let catalog = Arc::new(PerkCatalog::new());
        let ws_manager = Arc::new(ConnectionManager::new());
        let simulation = Arc::new(SimulationEngine::new(
            ledger.clone(),
            ws_manager.clone(),
            Duration::from_millis(config.simulation.tick_interval_ms),
        ));

        Self {
            user_sessions: SessionStore::new(),
            dashboard_sessions: SessionStore::new(),
            ledger,
            catalog,
            simulation,
            ws_manager,
            commentary: Arc::new(CommentaryService::new(model)),
        }
    }
}
