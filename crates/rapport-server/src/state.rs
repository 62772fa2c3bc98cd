use anyhow::Result;

use rapport_core::EvaluationService;
use rapport_store::{open_store, RapportConfig};

/// Shared handler state. Built once at startup and handed to the router.
#[derive(Clone)]
pub struct AppState {
    pub service: EvaluationService,
}

impl AppState {
    pub fn new(service: EvaluationService) -> Self {
        Self { service }
    }

    /// Open the configured store and wrap it in a service.
    pub async fn from_config(config: &RapportConfig) -> Result<Self> {
        let store = open_store(&config.store).await?;
        tracing::info!(store = store.name(), "store opened");
        Ok(Self::new(EvaluationService::new(
            store,
            config.evaluations.clone(),
        )))
    }
}
