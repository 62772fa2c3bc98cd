//! The `rapport tasks` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

pub async fn execute(
    rater: u64,
    offset: usize,
    json: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let service = super::open_service(config_path.as_deref()).await?;
    let page = service.tasks(rater, offset).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    if page.tasks.is_empty() {
        println!("Nothing left to rate.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Subject", "Criterion", "First time"]);
    for task in &page.tasks {
        table.add_row(vec![
            Cell::new(format!("{} ({})", task.subject_name, task.subject_id)),
            Cell::new(&task.criterion_name),
            Cell::new(if task.first_time { "yes" } else { "" }),
        ]);
    }
    println!("{table}");

    if let Some(next) = page.next_offset {
        println!("More tasks: --offset {next}");
    }
    Ok(())
}
