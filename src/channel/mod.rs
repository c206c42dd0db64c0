//! Channel-data storage engine
//!
//! The engine stores streamed multi-channel depth/time series for logs:
//!
//! - **range**: direction-aware range arithmetic and aligned chunk extents
//! - **index**: index-axis descriptors and time encoding
//! - **record**: channel rows, layouts and the validating reader
//! - **chunk**: the chunk document and cross-chunk record reassembly
//! - **chunker**: record stream → fixed-extent chunks
//! - **merger**: three-way merge of stored and incoming streams
//! - **chunk_store**: chunk persistence over the document store
//! - **error**: error types
//!
//! # Write path
//!
//! ```text
//! Reader → (Merger over stored chunks) → Chunker → ChunkStore bulk-write
//! ```
//!
//! # Read path
//!
//! ```text
//! ChunkStore range fetch → ChunkReader reassembly → slice → rows
//! ```

pub mod chunk;
pub mod chunk_store;
pub mod chunker;
pub mod error;
pub mod index;
pub mod merger;
pub mod range;
pub mod record;

pub use chunk::{ChannelDataChunk, ChunkReader};
pub use chunk_store::ChunkStore;
pub use chunker::DataChunker;
pub use error::{ChannelError, ChannelResult};
pub use index::{iso_from_micros, micros_from_iso, ChannelIndex};
pub use merger::ChannelDataMerger;
pub use range::{aligned_extent, IndexDirection, IndexRange};
pub use record::{ChannelDataReader, ChannelDataRecord, ChannelLayout};
