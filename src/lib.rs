//! TCP listener that logs whatever its clients send.
//!
//! Connections are accepted on one port and read in bounded chunks until
//! the peer closes or a read fails. How accepted connections are scheduled
//! is chosen by [`config::Strategy`]: serially, multiplexed on one task, or
//! one task per connection under an admission limit.

pub mod config;
pub mod logger;
pub mod network;
pub mod server;
