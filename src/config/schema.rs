//! Configuration schema for offcache
//!
//! Configuration is stored at `~/.config/offcache/config.toml`

use crate::cache::StoredResponse;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Generation and manifest settings
    pub cache: CacheConfig,

    /// Where seeded resources come from
    pub origin: OriginConfig,

    /// Where cache stores live
    pub storage: StorageConfig,

    /// Response served on a cache miss
    pub placeholder: PlaceholderConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Enable audit logging of lifecycle events
    pub audit_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            audit_log: true,
        }
    }
}

/// Generation and manifest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Identifier of the generation to install, activate and serve from
    pub generation: String,

    /// Resources to pre-populate (used when no manifest file is set)
    pub manifest: Vec<String>,

    /// TOML manifest file; takes precedence over `manifest`
    pub manifest_file: Option<PathBuf>,

    /// Maximum entries seeded concurrently during install
    pub seed_concurrency: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            generation: "v1".to_string(),
            manifest: vec!["/".to_string()],
            manifest_file: None,
            seed_concurrency: 8,
        }
    }
}

/// Origin configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginConfig {
    /// http(s) base URL or local site directory
    pub source: String,

    /// Per-request timeout in seconds (HTTP origins only)
    pub timeout_secs: u64,

    /// User-Agent sent to HTTP origins
    pub user_agent: String,

    /// Largest body accepted per resource
    pub max_body_bytes: u64,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            source: "public".to_string(),
            timeout_secs: 30,
            user_agent: concat!("offcache/", env!("CARGO_PKG_VERSION")).to_string(),
            max_body_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Store registry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for cache stores (defaults to the user cache dir)
    pub root: Option<PathBuf>,
}

/// Offline placeholder response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    /// Status code, must be in the 4xx class
    pub status: u16,

    /// Response body
    pub body: String,

    /// Content-Type header value
    pub content_type: String,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            status: 404,
            body: "Not available offline".to_string(),
            content_type: "text/plain; charset=utf-8".to_string(),
        }
    }
}

impl PlaceholderConfig {
    /// Build the fixed response served on every miss
    pub fn to_response(&self) -> StoredResponse {
        StoredResponse::new(
            self.status,
            vec![("content-type".to_string(), self.content_type.clone())],
            self.body.as_bytes().to_vec(),
        )
    }
}
