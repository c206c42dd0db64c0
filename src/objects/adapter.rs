//! Thin CRUD adapter for document-backed objects

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::store::{DocumentStore, Filter, StoreError, StoreResult};

/// Forwards CRUD for one object type to its collection
pub struct ObjectAdapter<T> {
    store: Arc<dyn DocumentStore>,
    collection: &'static str,
    _marker: PhantomData<T>,
}

impl<T> ObjectAdapter<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn DocumentStore>, collection: &'static str) -> Self {
        Self {
            store,
            collection,
            _marker: PhantomData,
        }
    }

    pub async fn list(&self, filter: &Filter) -> StoreResult<Vec<T>> {
        let docs = self.store.fetch(self.collection, filter, None).await?;
        docs.into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
            .collect()
    }

    pub async fn get(&self, uid: &str) -> StoreResult<Option<T>> {
        let docs = self
            .store
            .fetch(self.collection, &Filter::eq("uid", uid), None)
            .await?;
        docs.into_iter()
            .next()
            .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
            .transpose()
    }

    pub async fn add(&self, object: &T) -> StoreResult<()> {
        let doc = serde_json::to_value(object)?;
        self.store.insert(self.collection, doc).await
    }

    pub async fn update(&self, uid: &str, object: &T) -> StoreResult<usize> {
        let doc = serde_json::to_value(object)?;
        self.store
            .update(self.collection, &Filter::eq("uid", uid), doc)
            .await
    }

    pub async fn delete(&self, uid: &str) -> StoreResult<usize> {
        self.store
            .delete(self.collection, &Filter::eq("uid", uid))
            .await
    }
}
