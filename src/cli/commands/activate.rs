//! Activate command - make a generation current and evict the rest

use crate::audit::AuditLog;
use crate::cache::{create_cache, lifecycle_file};
use crate::cli::args::ActivateArgs;
use crate::cli::commands::activate_target;
use crate::config::Config;
use crate::error::{OffcacheError, OffcacheResult};
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the activate command
pub async fn execute(args: ActivateArgs, config: &Config) -> OffcacheResult<()> {
    let ctx = UiContext::detect();
    let state = lifecycle_file(config);
    let lifecycle = state.load().await?;
    let generation = activate_target(args.generation.as_deref(), &lifecycle, config).await?;
    let cache = create_cache(config).with_lifecycle(lifecycle);

    // Activating a generation without a store would evict everything servable
    let names = cache.storage().keys().await?;
    if !args.force && !names.iter().any(|n| generation.as_str() == n) {
        return Err(OffcacheError::GenerationNotInstalled(generation.to_string()));
    }

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Activating {}...", generation));
    let report = cache.activate(&generation).await;

    AuditLog::new(config).activate_completed(&report).await;
    state.save(&cache.lifecycle().await).await?;

    if let Some(reason) = &report.listing_error {
        spinner.stop_warn(&format!("Activated {}, stale stores not pruned", generation));
        ui::step_warn_hint(&ctx, "Could not list stores", reason);
        return Ok(());
    }

    if report.failed.is_empty() {
        spinner.stop(&format!("Activated {}", generation));
    } else {
        spinner.stop_warn(&format!(
            "Activated {}, {} stale store(s) left",
            generation,
            report.failed.len()
        ));
    }

    for name in &report.deleted {
        ui::step_ok_detail(&ctx, "Evicted", name);
    }
    for (name, reason) in &report.failed {
        ui::step_warn_hint(&ctx, &format!("Could not evict {}", name), reason);
    }

    Ok(())
}
