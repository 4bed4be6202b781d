//! On-disk cache store registry
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/<hex(store name)>/<sha256(key)>.json   entry record (key, status, headers)
//! <root>/<hex(store name)>/<sha256(key)>.body   raw body bytes
//! ```
//!
//! The body is committed before the record, each via write-then-rename, so a
//! reader that finds a record always finds the complete body next to it.

use crate::cache::{RequestKey, StoredResponse};
use crate::error::{OffcacheError, OffcacheResult};
use crate::storage::CacheStorage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

const RECORD_EXT: &str = "json";
const BODY_EXT: &str = "body";

/// Entry record persisted next to the body
#[derive(Debug, Serialize, Deserialize)]
struct EntryRecord {
    key: RequestKey,
    status: u16,
    headers: Vec<(String, String)>,
    body_len: u64,
    stored_at: DateTime<Utc>,
}

/// Store registry backed by a directory tree
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    /// Create a registry rooted at `root` (created lazily on first open)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn store_dir(&self, name: &str) -> PathBuf {
        self.root.join(hex::encode(name.as_bytes()))
    }

    fn entry_path(&self, name: &str, key: &RequestKey, ext: &str) -> PathBuf {
        self.store_dir(name)
            .join(format!("{}.{}", key.digest(), ext))
    }

    async fn write_atomic(path: &Path, contents: &[u8]) -> OffcacheResult<()> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| OffcacheError::Internal(format!("bad entry path {}", path.display())))?;
        let tmp = path.with_file_name(format!(".{}.tmp", file_name));

        fs::write(&tmp, contents)
            .await
            .map_err(|e| OffcacheError::io(format!("writing {}", tmp.display()), e))?;
        fs::rename(&tmp, path)
            .await
            .map_err(|e| OffcacheError::io(format!("committing {}", path.display()), e))
    }

    async fn read_record(path: &Path, store: &str) -> OffcacheResult<Option<EntryRecord>> {
        let content = match fs::read(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(OffcacheError::io(
                    format!("reading entry record {}", path.display()),
                    e,
                ))
            }
        };

        serde_json::from_slice(&content)
            .map(Some)
            .map_err(|e| OffcacheError::StoreCorrupt {
                store: store.to_string(),
                reason: format!("{}: {}", path.display(), e),
            })
    }
}

#[async_trait]
impl CacheStorage for DiskStorage {
    async fn open(&self, name: &str) -> OffcacheResult<()> {
        if name.is_empty() {
            return Err(OffcacheError::InvalidGeneration(name.to_string()));
        }

        let dir = self.store_dir(name);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| OffcacheError::io(format!("creating store {}", dir.display()), e))?;
        debug!("Opened store {} at {}", name, dir.display());
        Ok(())
    }

    async fn delete(&self, name: &str) -> OffcacheResult<bool> {
        let dir = self.store_dir(name);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(OffcacheError::io(
                format!("deleting store {}", dir.display()),
                e,
            )),
        }
    }

    async fn keys(&self) -> OffcacheResult<Vec<String>> {
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => {
                return Err(OffcacheError::io(
                    format!("listing stores in {}", self.root.display()),
                    e,
                ))
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| OffcacheError::io("reading store directory entry", e))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }

            let decoded = entry
                .file_name()
                .to_str()
                .and_then(|n| hex::decode(n).ok())
                .and_then(|bytes| String::from_utf8(bytes).ok());
            match decoded {
                Some(name) => names.push(name),
                None => debug!("Skipping foreign directory {}", entry.path().display()),
            }
        }

        names.sort();
        Ok(names)
    }

    async fn get(&self, name: &str, key: &RequestKey) -> OffcacheResult<Option<StoredResponse>> {
        let record_path = self.entry_path(name, key, RECORD_EXT);
        let Some(record) = Self::read_record(&record_path, name).await? else {
            return Ok(None);
        };

        // Digest collision or tampering: treat as a miss rather than serve the wrong entry
        if &record.key != key {
            debug!("Entry record {} holds {}, not {}", record_path.display(), record.key, key);
            return Ok(None);
        }

        let body_path = self.entry_path(name, key, BODY_EXT);
        let body = fs::read(&body_path)
            .await
            .map_err(|e| OffcacheError::StoreCorrupt {
                store: name.to_string(),
                reason: format!("missing body {}: {}", body_path.display(), e),
            })?;

        if body.len() as u64 != record.body_len {
            return Err(OffcacheError::StoreCorrupt {
                store: name.to_string(),
                reason: format!(
                    "body {} has {} bytes, record says {}",
                    body_path.display(),
                    body.len(),
                    record.body_len
                ),
            });
        }

        Ok(Some(StoredResponse {
            status: record.status,
            headers: record.headers,
            body,
        }))
    }

    async fn put(
        &self,
        name: &str,
        key: &RequestKey,
        response: StoredResponse,
    ) -> OffcacheResult<()> {
        if !fs::try_exists(self.store_dir(name)).await.unwrap_or(false) {
            return Err(OffcacheError::StoreNotFound(name.to_string()));
        }

        let record = EntryRecord {
            key: key.clone(),
            status: response.status,
            headers: response.headers,
            body_len: response.body.len() as u64,
            stored_at: Utc::now(),
        };

        Self::write_atomic(&self.entry_path(name, key, BODY_EXT), &response.body).await?;
        let record_json = serde_json::to_vec_pretty(&record)?;
        Self::write_atomic(&self.entry_path(name, key, RECORD_EXT), &record_json).await?;

        debug!("Stored {} in {} ({} bytes)", key, name, record.body_len);
        Ok(())
    }

    async fn entries(&self, name: &str) -> OffcacheResult<Vec<RequestKey>> {
        let store_dir = self.store_dir(name);
        let mut dir = match fs::read_dir(&store_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(OffcacheError::StoreNotFound(name.to_string()))
            }
            Err(e) => {
                return Err(OffcacheError::io(
                    format!("listing entries in {}", store_dir.display()),
                    e,
                ))
            }
        };

        let mut keys = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| OffcacheError::io("reading store entry", e))?
        {
            let path = entry.path();
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if hidden || path.extension().is_none_or(|ext| ext != RECORD_EXT) {
                continue;
            }
            if let Some(record) = Self::read_record(&path, name).await? {
                keys.push(record.key);
            }
        }

        keys.sort_by(|a, b| a.url.cmp(&b.url).then_with(|| a.method.cmp(&b.method)));
        Ok(keys)
    }

    fn backend_name(&self) -> &'static str {
        "disk"
    }
}
