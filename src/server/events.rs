// Server lifecycle events
// Every socket lifecycle step is reported through one of these

use std::io;
use std::net::SocketAddr;

use super::tracker::ConnectionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// A connection was accepted and admitted
    Connected { id: ConnectionId, peer: SocketAddr },
    /// One read returned data
    Received { id: ConnectionId, bytes: Vec<u8> },
    /// Peer closed its side; the connection has been released
    Closed { id: ConnectionId },
    /// A read failed; the connection has been released
    Failed {
        id: ConnectionId,
        kind: io::ErrorKind,
        os_code: Option<i32>,
        message: String,
    },
    /// Admission limit reached; the connection was shut down unserved
    Refused {
        peer: SocketAddr,
        active: usize,
        limit: usize,
    },
    /// Accept returned an error; the listener keeps going
    AcceptFailed {
        os_code: Option<i32>,
        message: String,
    },
}

impl ServerEvent {
    pub fn read_failed(id: ConnectionId, err: &io::Error) -> Self {
        Self::Failed {
            id,
            kind: err.kind(),
            os_code: err.raw_os_error(),
            message: err.to_string(),
        }
    }

    pub fn accept_failed(err: &io::Error) -> Self {
        Self::AcceptFailed {
            os_code: err.raw_os_error(),
            message: err.to_string(),
        }
    }
}
