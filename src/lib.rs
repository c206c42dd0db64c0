//! # Derrick
//!
//! A WITSML drilling-data server: wells, wellbores and logs stored as
//! documents, with a channel-data storage engine for streamed multi-channel
//! depth/time series.
//!
//! ## Features
//!
//! - **Chunked channel storage**: log data partitioned into fixed-extent,
//!   non-overlapping chunks aligned to the primary index
//! - **Merge-on-write**: incoming readers merge with stored data channel by
//!   channel, preserving monotonic index order
//! - **Range queries**: records reassembled across chunks, sliced by
//!   mnemonic, with per-curve index-range bookkeeping on the header
//! - **Transactions**: attach-then-save rollback records around every write
//!   batch
//!
//! ## Modules
//!
//! - [`store`]: document store, filters and transactions
//! - [`channel`]: the channel-data storage engine
//! - [`logs`]: log headers and the adapter facade over the engine
//! - [`objects`]: thin CRUD for wells and wellbores
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use derrick::api::{serve, AppState};
//! use derrick::config::Config;
//! use derrick::store::FileStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let store = Arc::new(FileStore::open(&config.store.data_dir)?);
//!     let state = AppState::new(store, config.channel.clone(), config.api.clone());
//!     serve(state, &config.api).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod channel;
pub mod config;
pub mod logs;
pub mod objects;
pub mod store;

// Re-export top-level types for convenience
pub use channel::{
    ChannelDataChunk, ChannelDataMerger, ChannelDataReader, ChannelDataRecord, ChannelError,
    ChannelIndex, ChannelLayout, ChannelResult, ChunkReader, ChunkStore, DataChunker,
    IndexDirection, IndexRange,
};

pub use logs::{IndexType, Log, LogAdapter, LogCurve, LogQuery, LogShape, RequestContext};

pub use store::{
    DocumentStore, FileStore, Filter, Sort, StoreError, StoreResult, Transaction,
    TransactionAction,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, ChannelSettings, Config, ConfigError, LoggingConfig, StoreConfig};
