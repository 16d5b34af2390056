// Per-connection dispatch
// One handler task per admitted connection, bounded by the admission limit

use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::server::connection::accept_connection;
use crate::server::events::ServerEvent;

/// Accept forever, handing each admitted connection to its own task.
///
/// Connections over `server.max_connections` are shut down immediately and
/// never get a handler. The listener does not wait on handlers.
pub async fn run(listener: &TcpListener, state: &Arc<AppState>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                if let Some(conn) = accept_connection(stream, peer, state) {
                    tokio::spawn(conn.serve());
                }
            }
            Err(e) => state.emit(ServerEvent::accept_failed(&e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use crate::config::Strategy;
    use crate::server::testing::{self, TestServer};
    use crate::server::ServerEvent;

    #[tokio::test]
    async fn test_zero_byte_client_is_released() {
        testing::assert_zero_byte_close(Strategy::PerConnection).await;
    }

    #[tokio::test]
    async fn test_reads_are_capped() {
        testing::assert_reads_capped(Strategy::PerConnection).await;
    }

    #[tokio::test]
    async fn test_hello_scenario() {
        testing::assert_hello_scenario(Strategy::PerConnection).await;
    }

    #[tokio::test]
    async fn test_burst_of_clients_progress_independently() {
        let mut server = TestServer::start(testing::test_config(Strategy::PerConnection, 8)).await;

        let mut clients = Vec::new();
        for _ in 0..5 {
            clients.push(TcpStream::connect(server.addr).await.unwrap());
        }
        let mut ids = Vec::new();
        for client in &clients {
            ids.push(server.expect_connected(client).await);
        }
        assert_eq!(server.state.connections.active(), 5);

        // Closing one client leaves the other handlers running
        let closed = clients.remove(0);
        let closed_id = ids.remove(0);
        drop(closed);
        assert_eq!(
            server.next_event().await,
            ServerEvent::Closed { id: closed_id }
        );

        for (i, client) in clients.iter_mut().enumerate() {
            client
                .write_all(format!("client-{i}").as_bytes())
                .await
                .unwrap();
        }
        let expected: Vec<_> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, format!("client-{i}").len()))
            .collect();
        let received = server.collect_payloads(&expected).await;
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(received[id], format!("client-{i}").into_bytes());
        }
        assert_eq!(server.state.connections.active(), 4);

        drop(clients);
        server.expect_all_closed(&ids).await;
        assert_eq!(server.state.connections.active(), 0);
        server.stop().await;
    }

    #[tokio::test]
    async fn test_connection_over_limit_is_refused() {
        let mut server = TestServer::start(testing::test_config(Strategy::PerConnection, 2)).await;

        let first = TcpStream::connect(server.addr).await.unwrap();
        let first_id = server.expect_connected(&first).await;
        let second = TcpStream::connect(server.addr).await.unwrap();
        server.expect_connected(&second).await;

        let mut third = TcpStream::connect(server.addr).await.unwrap();
        match server.next_event().await {
            ServerEvent::Refused {
                peer,
                active,
                limit,
            } => {
                assert_eq!(peer, third.local_addr().unwrap());
                assert_eq!(active, 2);
                assert_eq!(limit, 2);
            }
            other => panic!("expected Refused, got {other:?}"),
        }

        // Refused peer sees its connection closed without any handler
        let mut buf = [0u8; 8];
        let n = third.read(&mut buf).await.unwrap_or(0);
        assert_eq!(n, 0);

        drop(first);
        assert_eq!(
            server.next_event().await,
            ServerEvent::Closed { id: first_id }
        );

        let fourth = TcpStream::connect(server.addr).await.unwrap();
        server.expect_connected(&fourth).await;
        assert_eq!(server.state.connections.active(), 2);
        server.stop().await;
    }
}
