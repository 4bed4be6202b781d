//! Offline resource cache
//!
//! Owns a registry of named cache stores, one per generation, and answers
//! intercepted requests exclusively from the current generation.
//!
//! # Lifecycle
//!
//! | Event | Effect |
//! |-------|--------|
//! | install(manifest, G) | Opens store G and seeds every manifest entry; failed entries are skipped |
//! | activate(G) | Deletes every store not named G |
//! | serve(G, request) | Exact-match lookup in G; a miss yields the placeholder, never the network |
//!
//! A generation is created at install, becomes current at activation and is
//! evicted by the next activation that names a different generation. Hosts
//! that outlive a single process persist the lifecycle with `LifecycleFile`
//! and restore it through `OfflineCache::with_lifecycle`.

mod entry;
mod factory;
mod lifecycle;
mod offline;
mod state;

pub use entry::{Generation, RequestKey, StoredResponse};
pub use factory::{create_cache, lifecycle_file};
pub use lifecycle::{Lifecycle, Phase};
pub use offline::{
    ActivateReport, InstallReport, OfflineCache, SeedOutcome, DEFAULT_SEED_CONCURRENCY,
};
pub use state::LifecycleFile;
