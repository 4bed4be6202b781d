//! List command - show cache stores

use crate::cache::{create_cache, lifecycle_file, Generation, Lifecycle};
use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Config;
use crate::error::OffcacheResult;
use crate::storage::CacheStorage;
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;

/// One row of the store listing
#[derive(Debug, Serialize)]
struct StoreRow {
    name: String,
    /// Activated and serving
    current: bool,
    /// Installed, awaiting activation
    waiting: bool,
    /// None when the store could not be read
    entries: Option<usize>,
}

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> OffcacheResult<()> {
    let lifecycle = lifecycle_file(config).load().await?;
    let cache = create_cache(config);
    let rows = collect_rows(cache.storage().as_ref(), &lifecycle).await?;

    if rows.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(&ctx, "No cache stores");
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&rows),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Plain => {
            for row in &rows {
                println!("{}", row.name);
            }
        }
    }

    Ok(())
}

async fn collect_rows(
    storage: &dyn CacheStorage,
    lifecycle: &Lifecycle,
) -> OffcacheResult<Vec<StoreRow>> {
    let mut rows = Vec::new();
    for name in storage.keys().await? {
        let entries = storage.entries(&name).await.ok().map(|e| e.len());
        rows.push(StoreRow {
            current: holds(&lifecycle.current, &name),
            waiting: holds(&lifecycle.waiting, &name),
            name,
            entries,
        });
    }
    Ok(rows)
}

fn holds(slot: &Option<Generation>, name: &str) -> bool {
    slot.as_ref().is_some_and(|g| g.as_str() == name)
}

fn print_table(rows: &[StoreRow]) {
    println!(
        "{:<32} {:<10} {:>8}",
        style("GENERATION").bold(),
        style("STATE").bold(),
        style("ENTRIES").bold()
    );
    println!("{}", "-".repeat(52));

    for row in rows {
        let state = if row.current {
            style("current").green()
        } else if row.waiting {
            style("waiting").cyan()
        } else {
            style("stale").yellow()
        };
        let entries = row
            .entries
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_string());

        println!("{:<32} {:<10} {:>8}", row.name, state, entries);
    }

    println!();
    println!("{} store(s)", rows.len());
}
