// Listener module
// Creates the listening TCP socket step by step so each failure is reported distinctly

use std::net::SocketAddr;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

use super::error::SetupError;
use crate::logger;

/// Create a `TcpListener` bound to `addr` with the given backlog.
///
/// `SO_REUSEADDR` is enabled so a restarted process can rebind a port
/// still in `TIME_WAIT`.
///
/// # Arguments
///
/// * `addr` - The socket address to bind to
/// * `backlog` - Established connections queued before new attempts are refused
///
/// # Returns
///
/// * `Ok(TcpListener)` - Listening socket registered with the tokio reactor
/// * `Err(SetupError)` - The step that failed, with its OS error
pub fn create_listener(addr: SocketAddr, backlog: i32) -> Result<TcpListener, SetupError> {
    // Create socket with appropriate domain (IPv4 or IPv6)
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))
        .map_err(|source| SetupError::SocketFailed { source })?;
    logger::log_socket_created(&addr);

    socket
        .set_reuse_address(true)
        .map_err(|source| SetupError::SocketFailed { source })?;

    // Set non-blocking mode for async compatibility
    socket
        .set_nonblocking(true)
        .map_err(|source| SetupError::SocketFailed { source })?;

    socket
        .bind(&addr.into())
        .map_err(|source| SetupError::BindFailed { addr, source })?;
    logger::log_socket_bound(&addr);

    socket
        .listen(backlog)
        .map_err(|source| SetupError::ListenFailed { backlog, source })?;
    logger::log_socket_listening(&addr, backlog);

    // Convert socket2::Socket to std::net::TcpListener, then to tokio::net::TcpListener
    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener).map_err(|source| SetupError::SocketFailed { source })
}
