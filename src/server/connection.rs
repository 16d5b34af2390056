// Connection handling module
// Admission of accepted sockets and the per-connection read loop

use std::io;
use std::net::{Shutdown, SocketAddr};
use std::sync::Arc;

use socket2::SockRef;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use super::events::ServerEvent;
use super::tracker::{ConnectionGuard, ConnectionId};
use crate::config::AppState;

/// Result of a single non-blocking read attempt
#[derive(Debug)]
pub enum ReadOutcome {
    Data(usize),
    WouldBlock,
    Eof,
    Failed(io::Error),
}

/// Why a connection is being torn down
#[derive(Debug)]
pub enum CloseReason {
    PeerClosed,
    ReadFailed(io::Error),
}

/// An admitted client connection.
///
/// Owns the stream and its admission slot; whichever dispatcher holds the
/// value owns the connection.
pub struct Connection {
    id: ConnectionId,
    stream: TcpStream,
    guard: ConnectionGuard,
    state: Arc<AppState>,
}

/// Admit an accepted stream, or shut it down when the limit is reached.
///
/// # Arguments
///
/// * `stream` - The accepted TCP stream
/// * `peer` - The peer's socket address
/// * `state` - Shared application state
pub fn accept_connection(
    stream: TcpStream,
    peer: SocketAddr,
    state: &Arc<AppState>,
) -> Option<Connection> {
    match state.connections.try_admit() {
        Ok(guard) => {
            let id = guard.id();
            state.emit(ServerEvent::Connected { id, peer });
            Some(Connection {
                id,
                stream,
                guard,
                state: Arc::clone(state),
            })
        }
        Err(active) => {
            // No handler will run: close before reporting
            let _ = SockRef::from(&stream).shutdown(Shutdown::Both);
            drop(stream);
            state.emit(ServerEvent::Refused {
                peer,
                active,
                limit: state.connections.limit(),
            });
            None
        }
    }
}

impl Connection {
    /// Read until the peer closes or a read fails, logging every chunk.
    ///
    /// Each read takes at most `server.read_chunk` bytes and only the bytes
    /// returned by that read are reported.
    pub async fn serve(mut self) {
        let mut buf = vec![0u8; self.state.config.server.read_chunk];
        let reason = loop {
            match self.stream.read(&mut buf).await {
                Ok(0) => break CloseReason::PeerClosed,
                Ok(n) => self.record(&buf[..n]),
                Err(e) => break CloseReason::ReadFailed(e),
            }
        };
        self.close(reason);
    }

    /// Wait until the socket reports read readiness
    pub async fn readable(&self) -> io::Result<()> {
        self.stream.readable().await
    }

    /// Attempt exactly one read without waiting
    pub fn read_once(&self, buf: &mut [u8]) -> ReadOutcome {
        match self.stream.try_read(buf) {
            Ok(0) => ReadOutcome::Eof,
            Ok(n) => ReadOutcome::Data(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => ReadOutcome::WouldBlock,
            Err(e) => ReadOutcome::Failed(e),
        }
    }

    pub fn record(&self, bytes: &[u8]) {
        self.state.emit(ServerEvent::Received {
            id: self.id,
            bytes: bytes.to_vec(),
        });
    }

    /// Shut the socket down and release its slot, then report the closure.
    pub fn close(self, reason: CloseReason) {
        let Self {
            id,
            stream,
            guard,
            state,
        } = self;

        // Peer may already have reset the connection
        let _ = SockRef::from(&stream).shutdown(Shutdown::Both);
        drop(stream);
        drop(guard);

        match reason {
            CloseReason::PeerClosed => state.emit(ServerEvent::Closed { id }),
            CloseReason::ReadFailed(err) => state.emit(ServerEvent::read_failed(id, &err)),
        }
    }
}
