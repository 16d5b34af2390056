// Server module entry point
// Listener setup, connection admission and the dispatch strategies

pub mod connection;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod listener;
pub mod signal;
pub mod tracker;

// Rust does not allow `loop` as a module name (keyword), use server_loop instead
#[path = "loop.rs"]
pub mod server_loop;

#[cfg(test)]
pub mod testing;

// Re-export commonly used types
pub use error::{ServerError, SetupError};
pub use events::ServerEvent;
pub use listener::create_listener;
pub use server_loop::run_server;
pub use signal::{start_signal_handler, SignalHandler};
pub use tracker::{ConnectionGuard, ConnectionId, ConnectionTracker};
