// Server error types

use std::io;
use std::net::{AddrParseError, SocketAddr};

use thiserror::Error;

use crate::network::NetworkError;

/// Failure while bringing the listening socket up.
///
/// The first failing step aborts the sequence; the caller decides whether
/// to retry or stop.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("unable to create socket: {source}")]
    SocketFailed {
        #[source]
        source: io::Error,
    },

    #[error("socket unable to bind {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("error occurred during listen (backlog {backlog}): {source}")]
    ListenFailed {
        backlog: i32,
        #[source]
        source: io::Error,
    },
}

impl SetupError {
    /// Platform error code of the failing call
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::SocketFailed { source }
            | Self::BindFailed { source, .. }
            | Self::ListenFailed { source, .. } => source.raw_os_error(),
        }
    }
}

/// Top-level failure returned to the process entry point
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid listen address: {0}")]
    InvalidAddress(#[from] AddrParseError),

    #[error("access point bring-up failed: {0}")]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
