//! The `rapport seed` command.

use std::path::PathBuf;

use anyhow::Result;

use rapport_core::catalog::{load_fixture, seed, validate_fixture, Fixture};
use rapport_store::{load_config_from, open_store, StoreConfig};

pub async fn execute(fixture_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let fixture = match fixture_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("fixture not found: {}", path.display());
            }
            let fixture = load_fixture(&path)?;
            for w in validate_fixture(&fixture) {
                eprintln!("WARNING: {}", w.message);
            }
            fixture
        }
        None => {
            tracing::info!("no fixture given, seeding the default criteria");
            Fixture::default_criteria()
        }
    };

    let config = load_config_from(config_path.as_deref())?;
    if config.store == StoreConfig::Memory {
        tracing::warn!("seeding an in-memory store; data is discarded on exit");
    }
    let store = open_store(&config.store).await?;
    let report = seed(store.as_ref(), &fixture).await?;

    println!(
        "Seeded {} store: {} criteria created, {} already present, {} users, {} friendships",
        store.name(),
        report.criteria_created,
        report.criteria_existing,
        report.users,
        report.friendships
    );

    Ok(())
}
