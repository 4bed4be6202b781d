//! Lifecycle persistence between CLI invocations
//!
//! Each `offcache` run is a fresh process, so the generation made current by
//! the last activation (and the one installed but not yet activated) is kept
//! in `lifecycle.json` next to the stores. The file is replaced with
//! write-then-rename so a concurrent reader sees either the old or the new
//! record.

use crate::cache::lifecycle::Lifecycle;
use crate::error::{OffcacheError, OffcacheResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

const STATE_FILE: &str = "lifecycle.json";

/// Persisted lifecycle record for one store root
#[derive(Debug, Clone)]
pub struct LifecycleFile {
    path: PathBuf,
}

impl LifecycleFile {
    /// Record kept beside the stores under `root`
    pub fn in_root(root: &Path) -> Self {
        Self {
            path: root.join(STATE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record; a missing file means nothing was ever installed
    pub async fn load(&self) -> OffcacheResult<Lifecycle> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Lifecycle::default()),
            Err(e) => {
                return Err(OffcacheError::io(
                    format!("reading {}", self.path.display()),
                    e,
                ))
            }
        };

        serde_json::from_slice(&content).map_err(|e| OffcacheError::StateCorrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Replace the record with `lifecycle`
    pub async fn save(&self, lifecycle: &Lifecycle) -> OffcacheResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| OffcacheError::io(format!("creating {}", parent.display()), e))?;
        }

        let tmp = self.path.with_file_name(format!(".{}.tmp", STATE_FILE));
        fs::write(&tmp, serde_json::to_vec_pretty(lifecycle)?)
            .await
            .map_err(|e| OffcacheError::io(format!("writing {}", tmp.display()), e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| OffcacheError::io(format!("committing {}", self.path.display()), e))?;

        debug!("Saved lifecycle {} to {}", lifecycle, self.path.display());
        Ok(())
    }
}
