//! The `rapport serve` command.

use std::path::PathBuf;

use anyhow::Result;

use rapport_server::AppState;
use rapport_store::load_config_from;

pub async fn execute(bind: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(bind) = bind {
        config.server.bind = bind;
    }

    tracing::info!(
        threshold = config.evaluations.threshold,
        page_size = config.evaluations.page_size,
        familiarity_weighting = config.evaluations.familiarity_weighting,
        rater_weighting = config.evaluations.rater_weighting,
        "starting server"
    );
    let state = AppState::from_config(&config).await?;
    rapport_server::serve(state, &config.server.bind).await
}
