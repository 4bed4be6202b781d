//! In-memory cache store registry

use crate::cache::{RequestKey, StoredResponse};
use crate::error::{OffcacheError, OffcacheResult};
use crate::storage::CacheStorage;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

type Store = HashMap<RequestKey, StoredResponse>;

/// Process-local store registry guarded by an async RwLock
#[derive(Debug, Default)]
pub struct MemoryStorage {
    stores: RwLock<HashMap<String, Store>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, name: &str) -> OffcacheResult<()> {
        self.stores
            .write()
            .await
            .entry(name.to_string())
            .or_default();
        Ok(())
    }

    async fn delete(&self, name: &str) -> OffcacheResult<bool> {
        Ok(self.stores.write().await.remove(name).is_some())
    }

    async fn keys(&self) -> OffcacheResult<Vec<String>> {
        let mut names: Vec<String> = self.stores.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn get(&self, name: &str, key: &RequestKey) -> OffcacheResult<Option<StoredResponse>> {
        Ok(self
            .stores
            .read()
            .await
            .get(name)
            .and_then(|store| store.get(key))
            .cloned())
    }

    async fn put(
        &self,
        name: &str,
        key: &RequestKey,
        response: StoredResponse,
    ) -> OffcacheResult<()> {
        let mut stores = self.stores.write().await;
        let store = stores
            .get_mut(name)
            .ok_or_else(|| OffcacheError::StoreNotFound(name.to_string()))?;
        store.insert(key.clone(), response);
        Ok(())
    }

    async fn entries(&self, name: &str) -> OffcacheResult<Vec<RequestKey>> {
        let stores = self.stores.read().await;
        let store = stores
            .get(name)
            .ok_or_else(|| OffcacheError::StoreNotFound(name.to_string()))?;
        let mut keys: Vec<RequestKey> = store.keys().cloned().collect();
        keys.sort_by(|a, b| a.url.cmp(&b.url).then_with(|| a.method.cmp(&b.method)));
        Ok(keys)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &str) -> StoredResponse {
        StoredResponse::new(200, vec![], body.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn open_is_idempotent() {
        let storage = MemoryStorage::new();
        storage.open("v1").await.unwrap();
        storage
            .put("v1", &RequestKey::get("/"), response("root"))
            .await
            .unwrap();
        storage.open("v1").await.unwrap();

        let hit = storage.get("v1", &RequestKey::get("/")).await.unwrap();
        assert_eq!(hit.unwrap().body, b"root");
    }

    #[tokio::test]
    async fn put_requires_open_store() {
        let storage = MemoryStorage::new();
        let err = storage
            .put("v1", &RequestKey::get("/"), response("root"))
            .await
            .unwrap_err();
        assert!(matches!(err, OffcacheError::StoreNotFound(_)));
    }

    #[tokio::test]
    async fn get_from_missing_store_is_miss() {
        let storage = MemoryStorage::new();
        assert!(storage
            .get("nope", &RequestKey::get("/"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let storage = MemoryStorage::new();
        storage.open("v1").await.unwrap();
        storage.open("v2").await.unwrap();

        assert!(storage.delete("v1").await.unwrap());
        assert!(!storage.delete("v1").await.unwrap());
        assert_eq!(storage.keys().await.unwrap(), vec!["v2".to_string()]);
    }

    #[tokio::test]
    async fn entries_lists_keys() {
        let storage = MemoryStorage::new();
        storage.open("v1").await.unwrap();
        for url in ["/b.js", "/", "/a.css"] {
            storage
                .put("v1", &RequestKey::get(url), response(url))
                .await
                .unwrap();
        }

        let urls: Vec<String> = storage
            .entries("v1")
            .await
            .unwrap()
            .into_iter()
            .map(|k| k.url)
            .collect();
        assert_eq!(urls, vec!["/", "/a.css", "/b.js"]);
    }
}
