// Dispatch strategies
// Decide how accepted connections are scheduled

pub mod multiplexed;
pub mod per_connection;
pub mod serial;

use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::{AppState, Strategy};

/// Run the configured strategy on `listener`. Never returns on its own.
pub async fn run(strategy: Strategy, listener: &TcpListener, state: &Arc<AppState>) {
    match strategy {
        Strategy::Serial => serial::run(listener, state).await,
        Strategy::Multiplexed => multiplexed::run(listener, state).await,
        Strategy::PerConnection => per_connection::run(listener, state).await,
    }
}
