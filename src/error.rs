//! Error types for offcache
//!
//! All modules use `OffcacheResult<T>` as their return type. The lifecycle
//! operations themselves (install, activate, serve) never surface these to
//! their callers; they log and fall back instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for offcache operations
pub type OffcacheResult<T> = Result<T, OffcacheError>;

/// All errors that can occur in offcache
#[derive(Error, Debug)]
pub enum OffcacheError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Manifest errors
    #[error("Invalid manifest at {path}: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    #[error("Invalid generation identifier: {0:?}")]
    InvalidGeneration(String),

    #[error("Generation not installed: {0}")]
    GenerationNotInstalled(String),

    // Storage errors
    #[error("Cache store not found: {0}")]
    StoreNotFound(String),

    #[error("Cache store {store} is corrupt: {reason}")]
    StoreCorrupt { store: String, reason: String },

    #[error("Lifecycle record {path} is corrupt: {reason}")]
    StateCorrupt { path: PathBuf, reason: String },

    // Fetch errors
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Fetching {url} returned status {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("Resource path escapes the origin directory: {0}")]
    PathEscape(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl OffcacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a fetch error for a URL
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::GenerationNotInstalled(_) => {
                Some("Run: offcache install, or pass --force to activate anyway")
            }
            Self::StateCorrupt { .. } => {
                Some("Delete the lifecycle record and run: offcache activate --generation <G>")
            }
            Self::InvalidGeneration(_) => Some("Set cache.generation or pass --generation"),
            _ => None,
        }
    }
}
