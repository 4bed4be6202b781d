//! CLI command implementations

pub mod activate;
pub mod config;
pub mod get;
pub mod install;
pub mod list;
pub mod status;

pub use activate::execute as activate;
pub use config::execute as config;
pub use get::execute as get;
pub use install::execute as install;
pub use list::execute as list;
pub use status::execute as status;

use crate::cache::{Generation, Lifecycle};
use crate::config::Config;
use crate::error::OffcacheResult;
use crate::manifest::Manifest;

/// Generation an install seeds: flag, then the manifest's own, then config
pub(crate) fn install_target(
    flag: Option<&str>,
    manifest: &Manifest,
    config: &Config,
) -> OffcacheResult<Generation> {
    Generation::new(
        flag.or(manifest.generation())
            .unwrap_or(&config.cache.generation),
    )
}

/// Generation an activation makes current: flag, then the one installed and
/// waiting, then whatever a plain install would have seeded
pub(crate) async fn activate_target(
    flag: Option<&str>,
    lifecycle: &Lifecycle,
    config: &Config,
) -> OffcacheResult<Generation> {
    if let Some(flag) = flag {
        return Generation::new(flag);
    }
    if let Some(waiting) = &lifecycle.waiting {
        return Ok(waiting.clone());
    }
    let manifest = Manifest::resolve(config, None).await?;
    install_target(None, &manifest, config)
}

/// Generation requests are answered from: flag, then the activated one
///
/// `None` means nothing has been activated, so every request misses.
pub(crate) fn serving_generation(
    flag: Option<&str>,
    lifecycle: &Lifecycle,
) -> OffcacheResult<Option<Generation>> {
    match flag {
        Some(flag) => Generation::new(flag).map(Some),
        None => Ok(lifecycle.current.clone()),
    }
}
