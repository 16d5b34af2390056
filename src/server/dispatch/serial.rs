// Serial dispatch
// One connection at a time: accept, read to completion, accept again

use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::server::connection::accept_connection;
use crate::server::events::ServerEvent;

/// Serve connections strictly one after another.
///
/// While a connection is being served, further peers wait in the listen
/// backlog.
pub async fn run(listener: &TcpListener, state: &Arc<AppState>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                if let Some(conn) = accept_connection(stream, peer, state) {
                    conn.serve().await;
                }
            }
            Err(e) => state.emit(ServerEvent::accept_failed(&e)),
        }
    }
}
