//! Store transactions
//!
//! Writes that touch several documents attach a rollback record for each
//! mutation before applying it, then persist the attached records with
//! [`Transaction::save`]. A committed transaction discards its records; an
//! aborted one replays them in reverse to restore the previous state. The
//! records live in the `dbTransaction` collection keyed by transaction id, so
//! an interrupted batch can be rolled back after a restart.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::store::document::DocumentStore;
use crate::store::error::{StoreError, StoreResult};
use crate::store::filter::Filter;
use crate::store::DB_TRANSACTION;

/// What a mutation did, for rollback purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionAction {
    Add,
    Update,
    Delete,
}

/// One attached mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "transactionId")]
    pub transaction_id: Uuid,
    pub action: TransactionAction,
    pub collection: String,
    pub uri: String,
    /// Uid of the affected document
    pub uid: String,
    /// Pre-mutation snapshot; `None` for inserts
    pub document: Option<Value>,
}

/// An open write batch
pub struct Transaction {
    id: Uuid,
    store: Arc<dyn DocumentStore>,
    records: Vec<TransactionRecord>,
    /// Index into `records` up to which records have been persisted
    saved: usize,
    closed: bool,
}

impl Transaction {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            id: Uuid::new_v4(),
            store,
            records: Vec::new(),
            saved: 0,
            closed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Attach a mutation; must be called before the mutation is applied
    pub fn attach(
        &mut self,
        action: TransactionAction,
        collection: &str,
        uri: &str,
        uid: &str,
        snapshot: Option<Value>,
    ) {
        self.records.push(TransactionRecord {
            transaction_id: self.id,
            action,
            collection: collection.to_string(),
            uri: uri.to_string(),
            uid: uid.to_string(),
            document: snapshot,
        });
    }

    /// Persist attached records; called after each batch of mutations
    pub async fn save(&mut self) -> StoreResult<()> {
        self.ensure_open()?;
        for record in &self.records[self.saved..] {
            let doc = serde_json::to_value(record)?;
            self.store.insert(DB_TRANSACTION, doc).await?;
        }
        self.saved = self.records.len();
        Ok(())
    }

    /// Discard rollback records; the batch is final
    pub async fn commit(mut self) -> StoreResult<()> {
        self.ensure_open()?;
        self.closed = true;
        self.delete_records().await
    }

    /// Undo every attached mutation, newest first
    pub async fn rollback(mut self) -> StoreResult<()> {
        self.ensure_open()?;
        self.closed = true;

        tracing::warn!(
            transaction_id = %self.id,
            records = self.records.len(),
            "Rolling back transaction"
        );

        let records = std::mem::take(&mut self.records);
        for record in records.into_iter().rev() {
            let by_uid = Filter::eq("uid", record.uid.clone());
            match record.action {
                TransactionAction::Add => {
                    self.store.delete(&record.collection, &by_uid).await?;
                }
                TransactionAction::Update => {
                    if let Some(snapshot) = record.document {
                        self.store
                            .update(&record.collection, &by_uid, snapshot)
                            .await?;
                    }
                }
                TransactionAction::Delete => {
                    if let Some(snapshot) = record.document {
                        self.store.insert(&record.collection, snapshot).await?;
                    }
                }
            }
        }

        self.delete_records().await
    }

    async fn delete_records(&self) -> StoreResult<()> {
        self.store
            .delete(
                DB_TRANSACTION,
                &Filter::eq("transactionId", self.id.to_string()),
            )
            .await?;
        Ok(())
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed {
            Err(StoreError::TransactionClosed(self.id.to_string()))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileStore;
    use serde_json::json;

    fn store() -> Arc<dyn DocumentStore> {
        Arc::new(FileStore::in_memory())
    }

    #[tokio::test]
    async fn test_save_persists_records() {
        let store = store();
        let mut txn = Transaction::new(Arc::clone(&store));

        txn.attach(TransactionAction::Add, "well", "uri:w1", "w1", None);
        txn.save().await.unwrap();

        let records = store
            .fetch(DB_TRANSACTION, &Filter::All, None)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["action"], "add");
    }

    #[tokio::test]
    async fn test_commit_removes_records() {
        let store = store();
        let mut txn = Transaction::new(Arc::clone(&store));

        txn.attach(TransactionAction::Add, "well", "uri:w1", "w1", None);
        txn.save().await.unwrap();
        txn.commit().await.unwrap();

        let records = store
            .fetch(DB_TRANSACTION, &Filter::All, None)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_rollback_undoes_insert_and_update() {
        let store = store();
        store
            .insert("well", json!({"uid": "w1", "name": "Alpha"}))
            .await
            .unwrap();

        let mut txn = Transaction::new(Arc::clone(&store));

        // Update w1, recording its snapshot first
        txn.attach(
            TransactionAction::Update,
            "well",
            "uri:w1",
            "w1",
            Some(json!({"uid": "w1", "name": "Alpha"})),
        );
        store
            .update(
                "well",
                &Filter::eq("uid", "w1"),
                json!({"uid": "w1", "name": "Renamed"}),
            )
            .await
            .unwrap();

        // Insert w2
        txn.attach(TransactionAction::Add, "well", "uri:w2", "w2", None);
        store.insert("well", json!({"uid": "w2"})).await.unwrap();

        txn.save().await.unwrap();
        txn.rollback().await.unwrap();

        let docs = store.fetch("well", &Filter::All, None).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["name"], "Alpha");
    }

    #[tokio::test]
    async fn test_rollback_restores_deleted() {
        let store = store();
        store
            .insert("log", json!({"uid": "l1", "name": "GR"}))
            .await
            .unwrap();

        let mut txn = Transaction::new(Arc::clone(&store));
        txn.attach(
            TransactionAction::Delete,
            "log",
            "uri:l1",
            "l1",
            Some(json!({"uid": "l1", "name": "GR"})),
        );
        store
            .delete("log", &Filter::eq("uid", "l1"))
            .await
            .unwrap();

        txn.save().await.unwrap();
        txn.rollback().await.unwrap();

        let docs = store.fetch("log", &Filter::All, None).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["name"], "GR");
    }
}
