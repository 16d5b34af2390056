// Multiplexed dispatch
// A single task waits on the listener and every connection at once

use std::io;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;
use crate::server::connection::{accept_connection, CloseReason, Connection, ReadOutcome};
use crate::server::events::ServerEvent;

type Readiness = BoxFuture<'static, (Connection, io::Result<()>)>;

/// Park a connection until its socket becomes readable.
///
/// The connection travels with its own readiness future, so the set is
/// keyed by connection rather than by descriptor number.
fn arm(conn: Connection) -> Readiness {
    async move {
        let ready = conn.readable().await;
        (conn, ready)
    }
    .boxed()
}

/// Serve every connection from one task.
///
/// Each wake-up performs exactly one bounded read on the ready connection,
/// then control returns to the outer wait. There is no timeout on the wait.
pub async fn run(listener: &TcpListener, state: &Arc<AppState>) {
    let mut ready: FuturesUnordered<Readiness> = FuturesUnordered::new();
    let mut buf = vec![0u8; state.config.server.read_chunk];

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer)) => {
                        if let Some(conn) = accept_connection(stream, peer, state) {
                            ready.push(arm(conn));
                            logger::log_readiness_set(ready.len());
                        }
                    }
                    Err(e) => state.emit(ServerEvent::accept_failed(&e)),
                }
            }

            Some((conn, readiness)) = ready.next(), if !ready.is_empty() => {
                if let Err(e) = readiness {
                    conn.close(CloseReason::ReadFailed(e));
                    logger::log_readiness_set(ready.len());
                    continue;
                }

                match conn.read_once(&mut buf) {
                    ReadOutcome::Data(n) => {
                        conn.record(&buf[..n]);
                        ready.push(arm(conn));
                    }
                    // Spurious wake-up, readiness was cleared by the read
                    ReadOutcome::WouldBlock => ready.push(arm(conn)),
                    ReadOutcome::Eof => {
                        conn.close(CloseReason::PeerClosed);
                        logger::log_readiness_set(ready.len());
                    }
                    ReadOutcome::Failed(e) => {
                        conn.close(CloseReason::ReadFailed(e));
                        logger::log_readiness_set(ready.len());
                    }
                }
            }
        }
    }
}
