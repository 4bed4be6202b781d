//! Resource manifest parsing
//!
//! A manifest lists the resources pre-populated into a new generation. It can
//! live inline in the config (`cache.manifest`) or in its own TOML file:
//!
//! ```toml
//! generation = "site-v4"   # optional, overrides cache.generation
//! resources = ["/", "/app.css", "/js/main.js"]
//! ```

use crate::config::Config;
use crate::error::{OffcacheError, OffcacheResult};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;

/// On-disk manifest file shape
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    /// Generation this manifest belongs to
    #[serde(default)]
    generation: Option<String>,

    /// Ordered resource keys
    resources: Vec<String>,
}

/// Ordered, duplicate-free list of resource keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    resources: Vec<String>,
    generation: Option<String>,
}

impl Manifest {
    /// Build a manifest from resource keys
    ///
    /// Empty keys are rejected. Duplicates are dropped with a warning, keeping
    /// the first occurrence.
    pub fn new<I, S>(resources: I) -> OffcacheResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(resources, Path::new("<inline>"))
    }

    fn build<I, S>(resources: I, origin: &Path) -> OffcacheResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();

        for (idx, resource) in resources.into_iter().enumerate() {
            let resource = resource.into();
            if resource.trim().is_empty() {
                return Err(OffcacheError::ManifestInvalid {
                    path: origin.to_path_buf(),
                    reason: format!("resource #{} is empty", idx + 1),
                });
            }
            if seen.insert(resource.clone()) {
                unique.push(resource);
            } else {
                warn!("Dropping duplicate manifest entry {}", resource);
            }
        }

        Ok(Self {
            resources: unique,
            generation: None,
        })
    }

    /// Parse a manifest from a TOML file on disk
    pub async fn from_file(path: &Path) -> OffcacheResult<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            OffcacheError::io(format!("reading manifest {}", path.display()), e)
        })?;
        Self::parse(&content, path)
    }

    /// Parse a manifest from a TOML string
    pub fn parse(content: &str, path: &Path) -> OffcacheResult<Self> {
        let file: ManifestFile =
            toml::from_str(content).map_err(|e| OffcacheError::ManifestInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut manifest = Self::build(file.resources, path)?;
        manifest.generation = file.generation;
        Ok(manifest)
    }

    /// Resolve the manifest for a run: explicit file, then `cache.manifest_file`,
    /// then the inline `cache.manifest` list
    pub async fn resolve(config: &Config, override_path: Option<&Path>) -> OffcacheResult<Self> {
        let file: Option<PathBuf> = override_path
            .map(Path::to_path_buf)
            .or_else(|| config.cache.manifest_file.clone());

        match file {
            Some(path) => Self::from_file(&path).await,
            None => Self::new(config.cache.manifest.iter().cloned()),
        }
    }

    /// Generation named by the manifest file, if any
    pub fn generation(&self) -> Option<&str> {
        self.generation.as_deref()
    }

    /// Resource keys in manifest order
    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
