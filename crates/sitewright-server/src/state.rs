use std::sync::Arc;

use sitewright_core::config::ComposeConfig;
use sitewright_core::orchestrator::{Orchestrator, Platform};
use sitewright_core::registry::DeploymentDb;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<DeploymentDb>,
    pub orchestrator: Arc<Orchestrator>,
    pub config: ComposeConfig,
}

impl AppState {
    pub fn new(
        registry: Arc<DeploymentDb>,
        platform: Arc<dyn Platform>,
        config: ComposeConfig,
    ) -> Self {
        let orchestrator = Arc::new(Orchestrator::new(
            Arc::clone(&registry),
            platform,
            config.clone(),
        ));
        Self {
            registry,
            orchestrator,
            config,
        }
    }
}
