// Application state shared across handlers
use std::sync::Arc;

use crate::{
    app_config::AppConfig, services::scan_orchestrator::ScanOrchestrator,
    services::session::{SessionLimits, SessionStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub orchestrator: Arc<ScanOrchestrator>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: AppConfig, orchestrator: ScanOrchestrator) -> Self {
        let sessions = SessionStore::with_limits(SessionLimits::from(&config.session));
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            sessions,
        }
    }
}
