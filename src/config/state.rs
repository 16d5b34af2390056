// Application state module
// Owns the loaded configuration, connection accounting and event fan-out

use std::sync::Arc;
use tokio::sync::mpsc;

use super::types::Config;
use crate::logger;
use crate::server::{ConnectionTracker, ServerEvent};

/// Application state
pub struct AppState {
    pub config: Config,
    pub connections: Arc<ConnectionTracker>,

    // Optional observer of every lifecycle event
    events: Option<mpsc::UnboundedSender<ServerEvent>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let connections = Arc::new(ConnectionTracker::new(config.server.max_connections));
        Self {
            config,
            connections,
            events: None,
        }
    }

    /// Create state whose events are also delivered to the returned receiver
    pub fn with_subscriber(config: Config) -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = Self::new(config);
        state.events = Some(tx);
        (state, rx)
    }

    /// Log a lifecycle event and forward it to the subscriber, if any
    pub fn emit(&self, event: ServerEvent) {
        logger::log_event(&event);
        if let Some(tx) = &self.events {
            // Receiver may already be gone
            let _ = tx.send(event);
        }
    }
}
