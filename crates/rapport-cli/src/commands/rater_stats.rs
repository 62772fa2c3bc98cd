//! The `rapport rater-stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

pub async fn execute(user: Option<u64>, json: bool, config_path: Option<PathBuf>) -> Result<()> {
    let service = super::open_service(config_path.as_deref()).await?;

    let stats: Vec<_> = match user {
        Some(id) => service.rater_stats(id).await?.into_iter().collect(),
        None => service.all_rater_stats().await?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    if stats.is_empty() {
        println!("No ratings recorded.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "User",
        "Ratings",
        "Mean",
        "Std",
        "Extreme %",
        "Reliability",
    ]);
    for s in &stats {
        table.add_row(vec![
            Cell::new(s.user_id),
            Cell::new(s.ratings_count),
            Cell::new(format!("{:.2}", s.mean_score)),
            Cell::new(format!("{:.2}", s.std_score)),
            Cell::new(format!("{:.1}%", s.extreme_rate * 100.0)),
            Cell::new(format!("{:.3}", s.reliability)),
        ]);
    }
    println!("{table}");
    Ok(())
}
