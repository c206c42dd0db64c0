//! File-backed document store
//!
//! Each collection lives in memory and is mirrored to a single JSON file
//! (`<data_dir>/<collection>.json`). Collections are loaded lazily on first
//! access and rewritten after every mutation. An in-memory mode with no
//! backing directory is used by tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::store::document::DocumentStore;
use crate::store::error::{StoreError, StoreResult};
use crate::store::filter::{Filter, Sort};

/// Document store persisting collections as JSON files
pub struct FileStore {
    /// Backing directory; `None` keeps everything in memory
    data_dir: Option<PathBuf>,
    /// Loaded collections
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl FileStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed
    pub fn open(data_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir: Some(data_dir),
            collections: RwLock::new(HashMap::new()),
        })
    }

    /// Create a store with no backing files
    pub fn in_memory() -> Self {
        Self {
            data_dir: None,
            collections: RwLock::new(HashMap::new()),
        }
    }

    fn collection_path(&self, collection: &str) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", collection)))
    }

    fn load_from_disk(path: &Path) -> StoreResult<Vec<Value>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(path)?;
        let docs: Vec<Value> = serde_json::from_str(&content)?;
        Ok(docs)
    }

    /// Make sure `collection` is resident, loading it from disk if backed
    async fn ensure_loaded(&self, collection: &str) -> StoreResult<()> {
        {
            let collections = self.collections.read().await;
            if collections.contains_key(collection) {
                return Ok(());
            }
        }

        let docs = match self.collection_path(collection) {
            Some(path) => {
                let docs = Self::load_from_disk(&path)?;
                if !docs.is_empty() {
                    tracing::debug!(
                        collection = collection,
                        count = docs.len(),
                        "Loaded collection from disk"
                    );
                }
                docs
            }
            None => Vec::new(),
        };

        let mut collections = self.collections.write().await;
        collections.entry(collection.to_string()).or_insert(docs);
        Ok(())
    }

    fn persist(&self, collection: &str, docs: &[Value]) -> StoreResult<()> {
        if let Some(path) = self.collection_path(collection) {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string(docs)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            std::fs::write(path, content)?;
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn fetch(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> StoreResult<Vec<Value>> {
        self.ensure_loaded(collection).await?;

        let collections = self.collections.read().await;
        let docs = collections.get(collection).map(Vec::as_slice).unwrap_or(&[]);

        let mut matched: Vec<Value> = docs.iter().filter(|d| filter.matches(d)).cloned().collect();
        if let Some(sort) = sort {
            matched.sort_by(|a, b| sort.compare(a, b));
        }
        Ok(matched)
    }

    async fn insert(&self, collection: &str, doc: Value) -> StoreResult<()> {
        self.ensure_loaded(collection).await?;

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        docs.push(doc);
        self.persist(collection, docs)
    }

    async fn update(&self, collection: &str, filter: &Filter, doc: Value) -> StoreResult<usize> {
        self.ensure_loaded(collection).await?;

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        let mut replaced = 0;
        for existing in docs.iter_mut() {
            if filter.matches(existing) {
                *existing = doc.clone();
                replaced += 1;
            }
        }
        if replaced > 0 {
            self.persist(collection, docs)?;
        }
        Ok(replaced)
    }

    async fn delete(&self, collection: &str, filter: &Filter) -> StoreResult<usize> {
        self.ensure_loaded(collection).await?;

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        let before = docs.len();
        docs.retain(|d| !filter.matches(d));
        let removed = before - docs.len();
        if removed > 0 {
            self.persist(collection, docs)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_insert_and_fetch() {
        let store = FileStore::in_memory();

        store
            .insert("well", json!({"uid": "w1", "name": "Alpha"}))
            .await
            .unwrap();
        store
            .insert("well", json!({"uid": "w2", "name": "Beta"}))
            .await
            .unwrap();

        let all = store.fetch("well", &Filter::All, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let one = store
            .fetch("well", &Filter::eq("uid", "w2"), None)
            .await
            .unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0]["name"], "Beta");
    }

    #[tokio::test]
    async fn test_update_replaces_document() {
        let store = FileStore::in_memory();

        store
            .insert("well", json!({"uid": "w1", "name": "Alpha"}))
            .await
            .unwrap();

        let replaced = store
            .update(
                "well",
                &Filter::eq("uid", "w1"),
                json!({"uid": "w1", "name": "Alpha Prime"}),
            )
            .await
            .unwrap();
        assert_eq!(replaced, 1);

        let docs = store.fetch("well", &Filter::All, None).await.unwrap();
        assert_eq!(docs[0]["name"], "Alpha Prime");
    }

    #[tokio::test]
    async fn test_delete_by_filter() {
        let store = FileStore::in_memory();

        store.insert("well", json!({"uid": "w1"})).await.unwrap();
        store.insert("well", json!({"uid": "w2"})).await.unwrap();

        let removed = store
            .delete("well", &Filter::eq("uid", "w1"))
            .await
            .unwrap();
        assert_eq!(removed, 1);

        let docs = store.fetch("well", &Filter::All, None).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["uid"], "w2");
    }

    #[tokio::test]
    async fn test_persistence_across_reopen() {
        let dir = tempdir().unwrap();

        {
            let store = FileStore::open(dir.path()).unwrap();
            store
                .insert("log", json!({"uid": "l1", "name": "GR log"}))
                .await
                .unwrap();
        }

        {
            let store = FileStore::open(dir.path()).unwrap();
            let docs = store.fetch("log", &Filter::All, None).await.unwrap();
            assert_eq!(docs.len(), 1);
            assert_eq!(docs[0]["uid"], "l1");
        }
    }

    #[tokio::test]
    async fn test_fetch_sorted() {
        let store = FileStore::in_memory();

        for start in [2000.0, 0.0, 1000.0] {
            store
                .insert("chunk", json!({"indices": [{"start": start}]}))
                .await
                .unwrap();
        }

        let docs = store
            .fetch("chunk", &Filter::All, Some(&Sort::asc("indices.0.start")))
            .await
            .unwrap();
        let starts: Vec<f64> = docs
            .iter()
            .map(|d| d["indices"][0]["start"].as_f64().unwrap())
            .collect();
        assert_eq!(starts, vec![0.0, 1000.0, 2000.0]);
    }
}
