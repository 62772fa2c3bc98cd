pub mod init;
pub mod rater_stats;
pub mod seed;
pub mod serve;
pub mod summary;
pub mod tasks;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use rapport_core::EvaluationService;
use rapport_store::{load_config_from, open_store};

/// Load config and open the configured store.
pub(crate) async fn open_service(config_path: Option<&Path>) -> Result<EvaluationService> {
    let config = load_config_from(config_path)?;
    let store = open_store(&config.store).await?;
    Ok(EvaluationService::new(store, config.evaluations))
}
