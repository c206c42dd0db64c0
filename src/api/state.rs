//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::{ApiConfig, ChannelSettings};
use crate::logs::{LogAdapter, RequestContext};
use crate::objects::{ObjectAdapter, Well, Wellbore};
use crate::store::{DocumentStore, WELL, WELLBORE};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// The channel-data surface of logs
    pub logs: Arc<LogAdapter>,
    /// Thin CRUD over wells
    pub wells: Arc<ObjectAdapter<Well>>,
    /// Thin CRUD over wellbores
    pub wellbores: Arc<ObjectAdapter<Wellbore>>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Per-request data assembly limits
    pub context: RequestContext,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        settings: ChannelSettings,
        config: ApiConfig,
    ) -> Self {
        let context = RequestContext {
            max_data_nodes: settings.max_data_nodes,
            max_data_points: settings.max_data_points,
        };
        Self {
            logs: Arc::new(LogAdapter::new(Arc::clone(&store), settings)),
            wells: Arc::new(ObjectAdapter::new(Arc::clone(&store), WELL)),
            wellbores: Arc::new(ObjectAdapter::new(Arc::clone(&store), WELLBORE)),
            config: Arc::new(config),
            context,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
