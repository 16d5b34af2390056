// Test harness shared by the dispatch strategy tests
// Runs a real server on a loopback port and observes its events

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

use super::{create_listener, run_server, ConnectionId, ServerError, ServerEvent};
use crate::config::{AppState, Config, Strategy};

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

pub fn test_config(strategy: Strategy, max_connections: usize) -> Config {
    let mut cfg = Config::defaults().expect("defaults must deserialize");
    cfg.server.host = "127.0.0.1".to_string();
    cfg.server.port = 0;
    cfg.server.strategy = strategy;
    cfg.server.max_connections = max_connections;
    cfg
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<AppState>,
    events: mpsc::UnboundedReceiver<ServerEvent>,
    shutdown: Arc<Notify>,
    handle: JoinHandle<Result<(), ServerError>>,
}

impl TestServer {
    pub async fn start(cfg: Config) -> Self {
        let listener = create_listener(cfg.socket_addr().unwrap(), cfg.effective_backlog())
            .expect("listener setup");
        let addr = listener.local_addr().unwrap();
        let (state, events) = AppState::with_subscriber(cfg);
        let state = Arc::new(state);
        let shutdown = Arc::new(Notify::new());
        let handle = tokio::spawn(run_server(
            listener,
            Arc::clone(&state),
            Arc::clone(&shutdown),
        ));

        Self {
            addr,
            state,
            events,
            shutdown,
            handle,
        }
    }

    pub async fn stop(self) {
        self.shutdown.notify_one();
        self.handle.await.unwrap().unwrap();
    }

    pub async fn next_event(&mut self) -> ServerEvent {
        tokio::time::timeout(EVENT_TIMEOUT, self.events.recv())
            .await
            .expect("timed out waiting for a server event")
            .expect("event channel closed")
    }

    /// Assert that no event arrives within `window`
    pub async fn expect_quiet(&mut self, window: Duration) {
        if let Ok(event) = tokio::time::timeout(window, self.events.recv()).await {
            panic!("expected no event, got {event:?}");
        }
    }

    /// Next event must be the admission of `client`
    pub async fn expect_connected(&mut self, client: &TcpStream) -> ConnectionId {
        match self.next_event().await {
            ServerEvent::Connected { id, peer } => {
                assert_eq!(peer, client.local_addr().unwrap());
                id
            }
            other => panic!("expected Connected, got {other:?}"),
        }
    }

    /// Gather `Received` events until every connection delivered its byte count
    pub async fn collect_payloads(
        &mut self,
        expected: &[(ConnectionId, usize)],
    ) -> HashMap<ConnectionId, Vec<u8>> {
        let cap = self.state.config.server.read_chunk;
        let mut received: HashMap<ConnectionId, Vec<u8>> =
            expected.iter().map(|(id, _)| (*id, Vec::new())).collect();

        while expected.iter().any(|(id, len)| received[id].len() < *len) {
            match self.next_event().await {
                ServerEvent::Received { id, bytes } => {
                    assert!(bytes.len() <= cap, "read of {} bytes exceeds cap", bytes.len());
                    received
                        .get_mut(&id)
                        .unwrap_or_else(|| panic!("unexpected data on {id}"))
                        .extend_from_slice(&bytes);
                }
                other => panic!("expected Received, got {other:?}"),
            }
        }
        received
    }

    /// Wait for a `Closed` event for each of `ids`, in any order
    pub async fn expect_all_closed(&mut self, ids: &[ConnectionId]) {
        let mut pending: Vec<ConnectionId> = ids.to_vec();
        while !pending.is_empty() {
            match self.next_event().await {
                ServerEvent::Closed { id } => pending.retain(|p| *p != id),
                other => panic!("expected Closed, got {other:?}"),
            }
        }
    }
}

/// A client that connects and leaves without sending is released
pub async fn assert_zero_byte_close(strategy: Strategy) {
    let mut server = TestServer::start(test_config(strategy, 4)).await;

    let client = TcpStream::connect(server.addr).await.unwrap();
    let id = server.expect_connected(&client).await;
    drop(client);

    assert_eq!(server.next_event().await, ServerEvent::Closed { id });
    assert_eq!(server.state.connections.active(), 0);
    server.stop().await;
}

/// A payload longer than the read cap arrives in several capped reads
pub async fn assert_reads_capped(strategy: Strategy) {
    let mut server = TestServer::start(test_config(strategy, 4)).await;
    let cap = server.state.config.server.read_chunk;

    let mut client = TcpStream::connect(server.addr).await.unwrap();
    let id = server.expect_connected(&client).await;

    let mut payload = vec![b'a'; cap];
    payload.extend_from_slice(b"and then some more");
    client.write_all(&payload).await.unwrap();
    drop(client);

    let mut chunks = Vec::new();
    loop {
        match server.next_event().await {
            ServerEvent::Received { id: got, bytes } => {
                assert_eq!(got, id);
                assert!(bytes.len() <= cap);
                chunks.push(bytes);
            }
            ServerEvent::Closed { id: got } => {
                assert_eq!(got, id);
                break;
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    assert!(chunks.len() >= 2, "expected at least two reads, got {}", chunks.len());
    assert_eq!(chunks.concat(), payload);
    assert_eq!(server.state.connections.active(), 0);
    server.stop().await;
}

/// "hello" is reported with its exact length and nothing stale, then freed
pub async fn assert_hello_scenario(strategy: Strategy) {
    let mut server = TestServer::start(test_config(strategy, 4)).await;

    let mut client = TcpStream::connect(server.addr).await.unwrap();
    let id = server.expect_connected(&client).await;
    assert_eq!(server.state.connections.active(), 1);

    client.write_all(b"hello, longer line").await.unwrap();
    let first = server.collect_payloads(&[(id, 18)]).await;
    assert_eq!(first[&id], b"hello, longer line");

    // A shorter second read must not carry bytes from the first
    client.write_all(b"hello").await.unwrap();
    assert_eq!(
        server.next_event().await,
        ServerEvent::Received {
            id,
            bytes: b"hello".to_vec()
        }
    );

    client.shutdown().await.unwrap();
    assert_eq!(server.next_event().await, ServerEvent::Closed { id });
    assert_eq!(server.state.connections.active(), 0);
    drop(client);
    server.stop().await;
}
