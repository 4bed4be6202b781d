//! Named cache store registry
//!
//! The offline cache depends only on this capability set, so the backing
//! registry can be swapped:
//! - `MemoryStorage`: process-local, used by tests and embedders
//! - `DiskStorage`: one directory per store, used by the CLI

mod disk;
mod memory;

pub use disk::DiskStorage;
pub use memory::MemoryStorage;

use crate::cache::{RequestKey, StoredResponse};
use crate::error::OffcacheResult;
use async_trait::async_trait;

/// Abstract registry of named cache stores
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a store, creating it if absent
    async fn open(&self, name: &str) -> OffcacheResult<()>;

    /// Delete a store and all its entries. Returns false if it did not exist.
    async fn delete(&self, name: &str) -> OffcacheResult<bool>;

    /// List the names of all existing stores
    async fn keys(&self) -> OffcacheResult<Vec<String>>;

    /// Look up an entry by exact key. A missing store is a miss.
    async fn get(&self, name: &str, key: &RequestKey) -> OffcacheResult<Option<StoredResponse>>;

    /// Store an entry, replacing any previous value for the key
    async fn put(&self, name: &str, key: &RequestKey, response: StoredResponse)
        -> OffcacheResult<()>;

    /// List the keys held by a store
    async fn entries(&self, name: &str) -> OffcacheResult<Vec<RequestKey>>;

    /// Human-readable backend name for display
    fn backend_name(&self) -> &'static str;
}
