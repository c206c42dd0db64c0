//! Chunk persistence over the document store
//!
//! Chunks live in the `channelDataChunk` collection, partitioned by parent
//! log URI. Retrieval filters on the primary-index bounds stored on each
//! chunk document and orders by `indices.0.start` in log direction, so the
//! caller sees chunks the way the log reads.

use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::channel::chunk::ChannelDataChunk;
use crate::channel::error::{ChannelError, ChannelResult};
use crate::channel::range::IndexRange;
use crate::channel::record::ChannelLayout;
use crate::store::{
    DocumentStore, Filter, Sort, StoreError, Transaction, TransactionAction, CHANNEL_DATA_CHUNK,
};

/// Persistence for channel data chunks
pub struct ChunkStore {
    store: Arc<dyn DocumentStore>,
}

impl ChunkStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fetch the chunks of `uri` whose record span overlaps `range`
    ///
    /// Results come back ordered by primary start in log direction. A log
    /// with no stored chunks yields an empty list.
    pub async fn fetch(
        &self,
        uri: &str,
        primary_mnemonic: &str,
        range: &IndexRange,
        increasing: bool,
    ) -> ChannelResult<Vec<ChannelDataChunk>> {
        let mut filters = vec![Filter::eq_ci("uri", uri)];

        if range.start.is_some() || range.end.is_some() {
            filters.push(Filter::eq("indices.0.mnemonic", primary_mnemonic));
        }
        if let Some(start) = range.start {
            filters.push(if increasing {
                Filter::gte("indices.0.end", start)
            } else {
                Filter::lte("indices.0.end", start)
            });
        }
        if let Some(end) = range.end {
            filters.push(if increasing {
                Filter::lte("indices.0.start", end)
            } else {
                Filter::gte("indices.0.start", end)
            });
        }

        let sort = if increasing {
            Sort::asc("indices.0.start")
        } else {
            Sort::desc("indices.0.start")
        };

        let docs = self
            .store
            .fetch(CHANNEL_DATA_CHUNK, &Filter::And(filters), Some(&sort))
            .await
            .map_err(ChannelError::Read)?;

        let chunks = docs
            .into_iter()
            .map(|doc| {
                serde_json::from_value(doc)
                    .map_err(|e| ChannelError::Read(StoreError::Serialization(e.to_string())))
            })
            .collect::<ChannelResult<Vec<ChannelDataChunk>>>()?;

        tracing::debug!(uri = uri, count = chunks.len(), "Fetched chunks");
        Ok(chunks)
    }

    /// Insert or replace a batch of chunks
    ///
    /// Chunks without a uid are inserted under a fresh one; chunks carrying a
    /// uid replace the stored document with that `(uri, uid)`. The shared
    /// write attributes (uri and the channel lists) are applied here, so the
    /// chunker does not need to know them. Every mutation is attached to the
    /// transaction before it is applied, and the attached records are saved
    /// once the batch is in.
    pub async fn bulk_write(
        &self,
        uri: &str,
        chunks: Vec<ChannelDataChunk>,
        layout: &ChannelLayout,
        mut transaction: Option<&mut Transaction>,
    ) -> ChannelResult<usize> {
        let count = chunks.len();

        for mut chunk in chunks {
            chunk.uri = uri.to_string();
            chunk.mnemonic_list = layout.mnemonic_list();
            chunk.unit_list = layout.unit_list();
            chunk.null_value_list = layout.null_value_list();

            match chunk.uid.clone() {
                None => {
                    let uid = Uuid::new_v4().to_string();
                    chunk.uid = Some(uid.clone());
                    if let Some(txn) = transaction.as_deref_mut() {
                        txn.attach(TransactionAction::Add, CHANNEL_DATA_CHUNK, uri, &uid, None);
                    }
                    let doc = to_doc(&chunk).map_err(ChannelError::Write)?;
                    self.store
                        .insert(CHANNEL_DATA_CHUNK, doc)
                        .await
                        .map_err(ChannelError::Write)?;
                }
                Some(uid) => {
                    let by_id = Filter::and(vec![
                        Filter::eq_ci("uri", uri),
                        Filter::eq("uid", uid.clone()),
                    ]);
                    let snapshot = self
                        .store
                        .fetch(CHANNEL_DATA_CHUNK, &by_id, None)
                        .await
                        .map_err(ChannelError::Read)?
                        .into_iter()
                        .next();
                    if snapshot.is_none() {
                        return Err(ChannelError::NotFound(format!("chunk {}", uid)));
                    }
                    if let Some(txn) = transaction.as_deref_mut() {
                        txn.attach(
                            TransactionAction::Update,
                            CHANNEL_DATA_CHUNK,
                            uri,
                            &uid,
                            snapshot,
                        );
                    }
                    let doc = to_doc(&chunk).map_err(ChannelError::Update)?;
                    self.store
                        .update(CHANNEL_DATA_CHUNK, &by_id, doc)
                        .await
                        .map_err(ChannelError::Update)?;
                }
            }
        }

        if let Some(txn) = transaction {
            txn.save().await.map_err(ChannelError::Write)?;
        }

        tracing::debug!(uri = uri, count = count, "Wrote chunks");
        Ok(count)
    }

    /// Remove every chunk of `uri`
    pub async fn delete_by_uri(
        &self,
        uri: &str,
        transaction: Option<&mut Transaction>,
    ) -> ChannelResult<usize> {
        let by_uri = Filter::eq_ci("uri", uri);

        if let Some(txn) = transaction {
            let docs = self
                .store
                .fetch(CHANNEL_DATA_CHUNK, &by_uri, None)
                .await
                .map_err(ChannelError::Read)?;
            for doc in docs {
                let uid = doc
                    .get("uid")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                txn.attach(
                    TransactionAction::Delete,
                    CHANNEL_DATA_CHUNK,
                    uri,
                    &uid,
                    Some(doc),
                );
            }
            let removed = self
                .store
                .delete(CHANNEL_DATA_CHUNK, &by_uri)
                .await
                .map_err(ChannelError::Delete)?;
            txn.save().await.map_err(ChannelError::Delete)?;
            tracing::info!(uri = uri, count = removed, "Deleted chunks");
            Ok(removed)
        } else {
            let removed = self
                .store
                .delete(CHANNEL_DATA_CHUNK, &by_uri)
                .await
                .map_err(ChannelError::Delete)?;
            tracing::info!(uri = uri, count = removed, "Deleted chunks");
            Ok(removed)
        }
    }
}

fn to_doc(chunk: &ChannelDataChunk) -> Result<Value, StoreError> {
    serde_json::to_value(chunk).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::index::ChannelIndex;
    use crate::channel::range::IndexDirection;
    use crate::store::FileStore;
    use serde_json::json;

    const URI: &str = "eml://well(W1)/log(L1)";

    fn chunk_store() -> ChunkStore {
        ChunkStore::new(Arc::new(FileStore::in_memory()))
    }

    fn layout() -> ChannelLayout {
        ChannelLayout::from_lists("DEPTH,GR", "m,gAPI", "-999.25,-999.25").unwrap()
    }

    fn chunk(start: f64, end: f64, rows: serde_json::Value) -> ChannelDataChunk {
        ChannelDataChunk {
            uid: None,
            uri: String::new(),
            indices: vec![ChannelIndex::depth("DEPTH", "m", IndexDirection::Increasing)
                .with_range(start, end)],
            mnemonic_list: String::new(),
            unit_list: String::new(),
            null_value_list: String::new(),
            data: rows.to_string(),
            record_count: rows.as_array().map(Vec::len).unwrap_or(0),
        }
    }

    #[tokio::test]
    async fn test_bulk_write_assigns_uids_and_applies_lists() {
        let store = chunk_store();
        let written = store
            .bulk_write(
                URI,
                vec![chunk(100.0, 300.0, json!([[100.0, 1.0], [300.0, 3.0]]))],
                &layout(),
                None,
            )
            .await
            .unwrap();
        assert_eq!(written, 1);

        let fetched = store
            .fetch(URI, "DEPTH", &IndexRange::unbounded(), true)
            .await
            .unwrap();
        assert_eq!(fetched.len(), 1);
        assert!(fetched[0].uid.is_some());
        assert_eq!(fetched[0].uri, URI);
        assert_eq!(fetched[0].mnemonic_list, "DEPTH,GR");
        assert_eq!(fetched[0].null_value_list, "-999.25,-999.25");
    }

    #[tokio::test]
    async fn test_fetch_filters_by_range_and_sorts() {
        let store = chunk_store();
        store
            .bulk_write(
                URI,
                vec![
                    chunk(2000.0, 2900.0, json!([[2000.0, 1.0]])),
                    chunk(100.0, 900.0, json!([[100.0, 1.0]])),
                    chunk(1000.0, 1900.0, json!([[1000.0, 1.0]])),
                ],
                &layout(),
                None,
            )
            .await
            .unwrap();

        let fetched = store
            .fetch(URI, "DEPTH", &IndexRange::bounded(900.0, 2000.0), true)
            .await
            .unwrap();
        let starts: Vec<f64> = fetched.iter().map(|c| c.indices[0].start).collect();
        assert_eq!(starts, vec![100.0, 1000.0, 2000.0]);

        let fetched = store
            .fetch(URI, "DEPTH", &IndexRange::bounded(1000.0, 1500.0), true)
            .await
            .unwrap();
        let starts: Vec<f64> = fetched.iter().map(|c| c.indices[0].start).collect();
        assert_eq!(starts, vec![1000.0]);
    }

    #[tokio::test]
    async fn test_fetch_descending_order() {
        let store = chunk_store();
        store
            .bulk_write(
                URI,
                vec![
                    chunk(900.0, 100.0, json!([[900.0, 1.0]])),
                    chunk(2900.0, 2000.0, json!([[2900.0, 1.0]])),
                ],
                &layout(),
                None,
            )
            .await
            .unwrap();

        let fetched = store
            .fetch(URI, "DEPTH", &IndexRange::unbounded(), false)
            .await
            .unwrap();
        let starts: Vec<f64> = fetched.iter().map(|c| c.indices[0].start).collect();
        assert_eq!(starts, vec![2900.0, 900.0]);
    }

    #[tokio::test]
    async fn test_update_in_place_by_uid() {
        let store = chunk_store();
        store
            .bulk_write(
                URI,
                vec![chunk(100.0, 300.0, json!([[100.0, 1.0]]))],
                &layout(),
                None,
            )
            .await
            .unwrap();

        let mut stored = store
            .fetch(URI, "DEPTH", &IndexRange::unbounded(), true)
            .await
            .unwrap();
        let uid = stored[0].uid.clone();

        let mut updated = stored.remove(0);
        updated.data = json!([[100.0, 1.0], [200.0, 2.0]]).to_string();
        updated.record_count = 2;
        updated.indices[0].end = 200.0;

        store
            .bulk_write(URI, vec![updated], &layout(), None)
            .await
            .unwrap();

        let fetched = store
            .fetch(URI, "DEPTH", &IndexRange::unbounded(), true)
            .await
            .unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].uid, uid);
        assert_eq!(fetched[0].record_count, 2);
    }

    #[tokio::test]
    async fn test_case_insensitive_uri_match() {
        let store = chunk_store();
        store
            .bulk_write(
                URI,
                vec![chunk(100.0, 300.0, json!([[100.0, 1.0]]))],
                &layout(),
                None,
            )
            .await
            .unwrap();

        let fetched = store
            .fetch(
                &URI.to_uppercase(),
                "DEPTH",
                &IndexRange::unbounded(),
                true,
            )
            .await
            .unwrap();
        assert_eq!(fetched.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_by_uri_cascades() {
        let store = chunk_store();
        store
            .bulk_write(
                URI,
                vec![
                    chunk(100.0, 900.0, json!([[100.0, 1.0]])),
                    chunk(1000.0, 1900.0, json!([[1000.0, 1.0]])),
                ],
                &layout(),
                None,
            )
            .await
            .unwrap();

        let removed = store.delete_by_uri(URI, None).await.unwrap();
        assert_eq!(removed, 2);

        let fetched = store
            .fetch(URI, "DEPTH", &IndexRange::unbounded(), true)
            .await
            .unwrap();
        assert!(fetched.is_empty());
    }
}
