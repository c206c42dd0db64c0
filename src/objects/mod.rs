//! Drilling-domain objects
//!
//! Wells and wellbores are plain documents; their adapters are thin
//! forwarders over the document store with no engine involvement. Logs get
//! the same treatment for header CRUD, but their data lives with the
//! channel engine (see [`crate::logs`]).

pub mod adapter;
pub mod types;

pub use adapter::ObjectAdapter;
pub use types::{Well, Wellbore};
