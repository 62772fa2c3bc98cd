//! The `rapport summary` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use rapport_core::model::EvaluationSummaryItem;

pub async fn execute(
    subject: u64,
    viewer: Option<u64>,
    legacy: bool,
    json: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let service = super::open_service(config_path.as_deref()).await?;

    if legacy {
        let items = service.legacy_summary(subject).await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&items)?);
        } else {
            print_items(subject, &items);
        }
        return Ok(());
    }

    let summary = service.summary(viewer.unwrap_or(subject), subject).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let gating = summary.gating;
    if !gating.eligible {
        println!(
            "Summary locked: {} of {} ratings given, rate {} more to unlock.",
            gating.outbound_count,
            gating.threshold,
            gating.remaining()
        );
        return Ok(());
    }
    print_items(subject, &summary.criteria);
    Ok(())
}

fn print_items(subject: u64, items: &[EvaluationSummaryItem]) {
    if items.is_empty() {
        println!("No evaluations for user {subject} yet.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Criterion", "Average", "Raters"]);
    for item in items {
        table.add_row(vec![
            Cell::new(&item.criterion_name),
            Cell::new(format!("{:.2}", item.average_score)),
            Cell::new(item.count),
        ]);
    }
    println!("{table}");
}
