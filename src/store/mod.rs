//! Document store
//!
//! Derrick persists every object as a JSON document in a named collection.
//! This module provides:
//!
//! - **document**: the `DocumentStore` trait the rest of the server is
//!   written against
//! - **filter**: filter and sort primitives (equality, numeric bounds,
//!   AND/OR, nested field paths)
//! - **file**: a file-backed implementation, one JSON file per collection
//! - **query**: parser for the filter query-string used by list endpoints
//! - **transaction**: attach-then-save rollback records for write batches
//! - **error**: error types

pub mod document;
pub mod error;
pub mod file;
pub mod filter;
pub mod query;
pub mod transaction;

pub use document::DocumentStore;
pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use filter::{Filter, Sort};
pub use query::parse_filter;
pub use transaction::{Transaction, TransactionAction, TransactionRecord};

/// Collection holding well documents.
pub const WELL: &str = "well";
/// Collection holding wellbore documents.
pub const WELLBORE: &str = "wellbore";
/// Collection holding log header documents.
pub const LOG: &str = "log";
/// Collection holding channel data chunks.
pub const CHANNEL_DATA_CHUNK: &str = "channelDataChunk";
/// Collection holding transaction rollback records.
pub const DB_TRANSACTION: &str = "dbTransaction";
