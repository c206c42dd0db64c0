//! The `DocumentStore` trait
//!
//! Every adapter in Derrick talks to persistence through this trait. The
//! engine requires only the primitives listed here: filtered fetch with an
//! optional sort, insert, full-document replacement, and filtered delete.

use async_trait::async_trait;
use serde_json::Value;

use crate::store::error::StoreResult;
use crate::store::filter::{Filter, Sort};

/// Document-oriented persistence, one collection per object type
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch all documents in `collection` matching `filter`, optionally
    /// ordered by `sort`
    async fn fetch(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> StoreResult<Vec<Value>>;

    /// Insert a document into `collection`
    async fn insert(&self, collection: &str, doc: Value) -> StoreResult<()>;

    /// Replace every document matching `filter` with `doc`, returning the
    /// number of documents replaced
    async fn update(&self, collection: &str, filter: &Filter, doc: Value) -> StoreResult<usize>;

    /// Delete every document matching `filter`, returning the number removed
    async fn delete(&self, collection: &str, filter: &Filter) -> StoreResult<usize>;

    /// Count documents matching `filter`
    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<usize> {
        Ok(self.fetch(collection, filter, None).await?.len())
    }
}
