//! The `rapport validate` command.

use std::path::PathBuf;

use anyhow::Result;

use rapport_core::catalog::{load_fixture, validate_fixture};

pub fn execute(fixture_path: PathBuf) -> Result<()> {
    if !fixture_path.exists() {
        anyhow::bail!("fixture not found: {}", fixture_path.display());
    }
    let fixture = load_fixture(&fixture_path)?;

    println!(
        "Fixture: {} ({} criteria, {} users, {} friendships)",
        fixture_path.display(),
        fixture.criteria.len(),
        fixture.users.len(),
        fixture.friendships.len()
    );

    let warnings = validate_fixture(&fixture);
    for w in &warnings {
        println!("  WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Fixture valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
