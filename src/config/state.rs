// Application state module
// Everything a request handler needs, passed explicitly instead of held globally

use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::store::{SharedStore, TriviaStore};

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: SharedStore,
    /// Notified once when the process should stop accepting connections
    pub shutdown: Arc<Notify>,
}

impl AppState {
    pub fn new(config: Config, store: TriviaStore) -> Self {
        Self {
            config,
            store: Arc::new(store),
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
