//! Status command - summarize configuration and store health

use crate::cache::{create_cache, lifecycle_file};
use crate::config::{Config, ConfigManager};
use crate::error::OffcacheResult;
use crate::fetch::create_fetcher;
use crate::manifest::Manifest;
use crate::ui::{self, UiContext};

/// Execute the status command
pub async fn execute(config: &Config) -> OffcacheResult<()> {
    let ctx = UiContext::detect();
    let cache = create_cache(config);
    let storage = cache.storage();

    ui::intro(&ctx, "offcache status");

    ui::section(&ctx, "Configuration");
    ui::key_value(&ctx, "Configured generation", &config.cache.generation);
    ui::key_value(&ctx, "Origin", &create_fetcher(&config.origin).origin());
    ui::key_value(
        &ctx,
        "Store root",
        &ConfigManager::store_root(config).display().to_string(),
    );
    ui::key_value(&ctx, "Backend", storage.backend_name());
    match Manifest::resolve(config, None).await {
        Ok(manifest) => ui::key_value(&ctx, "Manifest", &format!("{} resources", manifest.len())),
        Err(e) => ui::key_value_status(&ctx, "Manifest", &e.to_string(), false),
    }

    ui::section(&ctx, "Lifecycle");
    let state = lifecycle_file(config);
    let lifecycle = state.load().await?;
    ui::key_value(&ctx, "Phase", &lifecycle.phase.to_string());
    ui::key_value(&ctx, "Record", &state.path().display().to_string());
    if let Some(waiting) = &lifecycle.waiting {
        ui::key_value_status(&ctx, "Waiting generation", waiting.as_str(), false);
        ui::remark(&ctx, &format!("Run: offcache activate --generation {}", waiting));
    }

    ui::section(&ctx, "Stores");
    let names = storage.keys().await?;

    match &lifecycle.current {
        Some(current) if names.iter().any(|n| current.as_str() == n) => {
            let entries = storage
                .entries(current.as_str())
                .await
                .map(|e| format!("{}, {} entries", current, e.len()))
                .unwrap_or_else(|e| format!("{}, unreadable: {}", current, e));
            ui::key_value_status(&ctx, "Current generation", &entries, true);
        }
        Some(current) => {
            ui::key_value_status(
                &ctx,
                "Current generation",
                &format!("{}, store missing", current),
                false,
            );
        }
        None => {
            ui::key_value_status(&ctx, "Current generation", "none", false);
            ui::remark(&ctx, "Run: offcache install && offcache activate");
        }
    }

    let stale: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|n| {
            lifecycle.current.as_ref().is_none_or(|g| g.as_str() != *n)
                && lifecycle.waiting.as_ref().is_none_or(|g| g.as_str() != *n)
        })
        .collect();
    if stale.is_empty() {
        ui::key_value_status(&ctx, "Stale stores", "none", true);
    } else {
        ui::key_value_status(&ctx, "Stale stores", &stale.join(", "), false);
        ui::remark(&ctx, "Run: offcache activate to prune");
    }

    Ok(())
}
