//! Log objects and their channel-data surface
//!
//! - **header**: log header documents and curve metadata
//! - **shape**: the `LogShape` capability surface the engine works against
//! - **query**: query types, projection and row formatting
//! - **adapter**: the facade mapping log operations onto the channel engine

pub mod adapter;
pub mod header;
pub mod query;
pub mod shape;

pub use adapter::LogAdapter;
pub use header::{IndexType, Log, LogCurve, LogData};
pub use query::{LogQuery, RequestContext, ReturnElements};
pub use shape::LogShape;
