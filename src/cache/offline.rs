//! The offline resource cache: install, activate and serve
//!
//! Every failure inside these operations is logged and turned into a safe
//! default. Callers receive reports or responses, never errors.

use crate::cache::entry::{Generation, RequestKey, StoredResponse};
use crate::cache::lifecycle::Lifecycle;
use crate::error::OffcacheResult;
use crate::fetch::ResourceFetcher;
use crate::manifest::Manifest;
use crate::storage::CacheStorage;
use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Default number of manifest entries seeded at once
pub const DEFAULT_SEED_CONCURRENCY: usize = 8;

/// Result of seeding one manifest entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SeedOutcome {
    /// Fetched and written to the new generation
    Stored { resource: String },
    /// Could not be fetched or written; not servable offline
    Failed { resource: String, reason: String },
}

impl SeedOutcome {
    pub fn resource(&self) -> &str {
        match self {
            Self::Stored { resource } | Self::Failed { resource, .. } => resource,
        }
    }
}

/// Summary of an install
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub generation: Generation,
    /// Resources now held by the generation, in manifest order
    pub stored: Vec<String>,
    /// Resources that failed, with reasons, in manifest order
    pub failed: Vec<(String, String)>,
    /// Set when the store itself could not be opened
    pub abandoned: Option<String>,
}

impl InstallReport {
    /// Whether the generation was created (possibly with failed entries)
    pub fn is_installed(&self) -> bool {
        self.abandoned.is_none()
    }

    /// Whether every manifest entry was stored
    pub fn is_complete(&self) -> bool {
        self.is_installed() && self.failed.is_empty()
    }
}

/// Summary of an activation
#[derive(Debug, Clone, Serialize)]
pub struct ActivateReport {
    pub generation: Generation,
    /// Stale stores removed
    pub deleted: Vec<String>,
    /// Stale stores that could not be removed, with reasons
    pub failed: Vec<(String, String)>,
    /// Set when the store list could not be read; nothing was pruned
    pub listing_error: Option<String>,
}

/// Offline resource cache over an injected store registry and fetcher
pub struct OfflineCache {
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn ResourceFetcher>,
    placeholder: StoredResponse,
    seed_concurrency: usize,
    lifecycle: Mutex<Lifecycle>,
}

impl OfflineCache {
    /// Create a cache serving `placeholder` on every miss
    pub fn new(
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn ResourceFetcher>,
        placeholder: StoredResponse,
    ) -> Self {
        Self {
            storage,
            fetcher,
            placeholder,
            seed_concurrency: DEFAULT_SEED_CONCURRENCY,
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    /// Limit how many entries are seeded at once (minimum 1)
    pub fn with_seed_concurrency(mut self, concurrency: usize) -> Self {
        self.seed_concurrency = concurrency.max(1);
        self
    }

    /// Resume from a lifecycle recorded by an earlier instance
    pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = Mutex::new(lifecycle);
        self
    }

    /// The store registry this cache operates on
    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    /// The response served on misses
    pub fn placeholder(&self) -> &StoredResponse {
        &self.placeholder
    }

    /// Snapshot of the lifecycle as seen by this instance
    pub async fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.lock().await.clone()
    }

    /// Seed `generation` from `manifest`
    pub async fn install(&self, manifest: &Manifest, generation: &Generation) -> InstallReport {
        self.install_with(manifest, generation, &|_: &SeedOutcome| {})
            .await
    }

    /// Seed `generation` from `manifest`, calling `on_seeded` as each entry settles
    pub async fn install_with(
        &self,
        manifest: &Manifest,
        generation: &Generation,
        on_seeded: &(dyn Fn(&SeedOutcome) + Send + Sync),
    ) -> InstallReport {
        self.lifecycle.lock().await.begin_install();
        info!(
            "Installing generation {} ({} resources from {})",
            generation,
            manifest.len(),
            self.fetcher.origin()
        );

        if let Err(e) = self.storage.open(generation.as_str()).await {
            error!("Abandoning install of {}: cannot open store: {}", generation, e);
            self.lifecycle.lock().await.abandon_install();
            return InstallReport {
                generation: generation.clone(),
                stored: vec![],
                failed: vec![],
                abandoned: Some(e.to_string()),
            };
        }

        // All-settled: every entry runs to completion regardless of the others
        let mut outcomes: Vec<(usize, SeedOutcome)> =
            stream::iter(manifest.resources().iter().enumerate())
                .map(move |(idx, resource)| async move {
                    let outcome = self.seed_one(generation, resource).await;
                    on_seeded(&outcome);
                    (idx, outcome)
                })
                .buffer_unordered(self.seed_concurrency)
                .collect()
                .await;
        outcomes.sort_by_key(|(idx, _)| *idx);

        let mut report = InstallReport {
            generation: generation.clone(),
            stored: vec![],
            failed: vec![],
            abandoned: None,
        };
        for (_, outcome) in outcomes {
            match outcome {
                SeedOutcome::Stored { resource } => report.stored.push(resource),
                SeedOutcome::Failed { resource, reason } => report.failed.push((resource, reason)),
            }
        }

        self.lifecycle.lock().await.finish_install(generation);
        info!(
            "Installed generation {}: {} stored, {} failed",
            generation,
            report.stored.len(),
            report.failed.len()
        );
        report
    }

    async fn seed_one(&self, generation: &Generation, resource: &str) -> SeedOutcome {
        match self.fetch_and_store(generation, resource).await {
            Ok(()) => {
                debug!("Seeded {} into {}", resource, generation);
                SeedOutcome::Stored {
                    resource: resource.to_string(),
                }
            }
            Err(e) => {
                warn!("Failed to seed {} into {}: {}", resource, generation, e);
                SeedOutcome::Failed {
                    resource: resource.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn fetch_and_store(&self, generation: &Generation, resource: &str) -> OffcacheResult<()> {
        let key = RequestKey::get(resource);
        let response = self.fetcher.fetch(&key).await?;
        self.storage
            .put(generation.as_str(), &key, response)
            .await
    }

    /// Make `generation` current by deleting every other store
    pub async fn activate(&self, generation: &Generation) -> ActivateReport {
        self.lifecycle.lock().await.begin_activate();
        info!("Activating generation {}", generation);

        let mut report = ActivateReport {
            generation: generation.clone(),
            deleted: vec![],
            failed: vec![],
            listing_error: None,
        };

        match self.storage.keys().await {
            Ok(names) => {
                if !names.iter().any(|n| generation.as_str() == n) {
                    warn!("Activating generation {} which has no store", generation);
                }

                let stale: Vec<String> = names
                    .into_iter()
                    .filter(|n| generation.as_str() != n)
                    .collect();

                let storage = &self.storage;
                let results = join_all(stale.into_iter().map(move |name| async move {
                    let result = storage.delete(&name).await;
                    (name, result)
                }))
                .await;

                for (name, result) in results {
                    match result {
                        Ok(_) => {
                            debug!("Evicted generation {}", name);
                            report.deleted.push(name);
                        }
                        Err(e) => {
                            warn!("Failed to evict generation {}: {}", name, e);
                            report.failed.push((name, e.to_string()));
                        }
                    }
                }
            }
            Err(e) => {
                warn!("Cannot list stores while activating {}: {}", generation, e);
                report.listing_error = Some(e.to_string());
            }
        }

        self.lifecycle.lock().await.finish_activate(generation);
        info!(
            "Activated generation {}: {} evicted, {} left stale",
            generation,
            report.deleted.len(),
            report.failed.len()
        );
        report
    }

    /// Answer one intercepted request from `generation`, never from the network
    pub async fn serve(&self, generation: &Generation, request: &RequestKey) -> StoredResponse {
        match self.storage.get(generation.as_str(), request).await {
            Ok(Some(response)) => {
                debug!("Cache hit for {} in {}", request, generation);
                response
            }
            Ok(None) => {
                debug!("Cache miss for {} in {}", request, generation);
                self.placeholder.clone()
            }
            Err(e) => {
                warn!("Serving placeholder for {}: {}", request, e);
                self.placeholder.clone()
            }
        }
    }
}
