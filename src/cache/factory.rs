//! Build an offline cache from configuration

use crate::cache::offline::OfflineCache;
use crate::cache::state::LifecycleFile;
use crate::config::{Config, ConfigManager};
use crate::fetch::create_fetcher;
use crate::storage::DiskStorage;
use std::sync::Arc;

/// Create the disk-backed cache described by `config`
///
/// Stores live under `storage.root` (or the default store root), seeding uses
/// the `[origin]` fetcher, and misses answer with `[placeholder]`.
pub fn create_cache(config: &Config) -> OfflineCache {
    let storage = DiskStorage::new(ConfigManager::store_root(config));
    OfflineCache::new(
        Arc::new(storage),
        create_fetcher(&config.origin),
        config.placeholder.to_response(),
    )
    .with_seed_concurrency(config.cache.seed_concurrency)
}

/// Lifecycle record kept beside the stores of `config`
pub fn lifecycle_file(config: &Config) -> LifecycleFile {
    LifecycleFile::in_root(&ConfigManager::store_root(config))
}
