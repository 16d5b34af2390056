// Server loop module
// Runs the configured dispatcher until shutdown, then releases the listener

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::dispatch;
use super::error::ServerError;
use crate::config::AppState;
use crate::logger;

/// Serve `listener` with the configured strategy until `shutdown` fires.
///
/// The listener is owned here and dropped on return, which closes the
/// listening socket. Handler tasks already spawned keep running.
pub async fn run_server(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) -> Result<(), ServerError> {
    let addr = listener.local_addr()?;
    let strategy = state.config.server.strategy;
    logger::log_dispatcher_start(strategy, &addr);

    tokio::select! {
        () = dispatch::run(strategy, &listener, &state) => {}
        () = shutdown.notified() => {
            logger::log_shutdown(&addr, state.connections.active());
        }
    }

    drop(listener);
    Ok(())
}
