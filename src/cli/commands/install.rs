//! Install command - seed a new generation from the manifest

use crate::audit::AuditLog;
use crate::cache::{create_cache, lifecycle_file, SeedOutcome};
use crate::cli::args::InstallArgs;
use crate::cli::commands::install_target;
use crate::config::Config;
use crate::error::{OffcacheError, OffcacheResult};
use crate::manifest::Manifest;
use crate::ui::{self, SeedProgress, UiContext};

/// Execute the install command
pub async fn execute(args: InstallArgs, config: &Config) -> OffcacheResult<()> {
    let ctx = UiContext::detect();
    let manifest = Manifest::resolve(config, args.manifest.as_deref()).await?;

    let generation = install_target(args.generation.as_deref(), &manifest, config)?;

    if manifest.is_empty() {
        ui::step_warn_hint(
            &ctx,
            "Manifest is empty",
            "the generation will be created with no entries",
        );
    }

    let state = lifecycle_file(config);
    let cache = create_cache(config).with_lifecycle(state.load().await?);
    let progress = SeedProgress::new(&ctx, generation.as_str(), manifest.len());
    let report = cache
        .install_with(&manifest, &generation, &|outcome: &SeedOutcome| {
            progress.on_seeded(outcome)
        })
        .await;
    progress.finish();

    AuditLog::new(config).install_completed(&report).await;

    if let Some(reason) = &report.abandoned {
        return Err(OffcacheError::User(format!(
            "Install of {} abandoned: {}",
            generation, reason
        )));
    }

    // The new generation waits here; the current one keeps serving until activate
    state.save(&cache.lifecycle().await).await?;

    if ctx.use_fancy_output() {
        for (resource, reason) in &report.failed {
            ui::step_error_detail(&ctx, resource, reason);
        }
    }

    let summary = format!(
        "Installed {}: {}/{} resources cached",
        generation,
        report.stored.len(),
        manifest.len()
    );
    if report.is_complete() {
        ui::outro_success(&ctx, &summary);
    } else {
        ui::outro_warn(&ctx, &summary);
        ui::remark(&ctx, "Failed resources will not be available offline");
    }
    ui::remark(
        &ctx,
        &format!("Run: offcache activate --generation {}", generation),
    );

    Ok(())
}
