use std::sync::Arc;

use ap_tcp_logger::config::{AppState, Config};
use ap_tcp_logger::logger;
use ap_tcp_logger::network::{self, AccessPoint, HostedAccessPoint};
use ap_tcp_logger::server::{self, ServerError, SignalHandler};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional config path (without extension) as the only argument
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = Config::load_from(&config_path)?;
    cfg.validate()?;
    logger::init(&cfg.logging)?;
    logger::log_effective_config(&cfg);

    // Build the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    if let Err(e) = runtime.block_on(async_main(cfg)) {
        logger::log_error(&e.to_string());
        return Err(e.into());
    }
    Ok(())
}

async fn async_main(cfg: Config) -> Result<(), ServerError> {
    let stations = HostedAccessPoint.start(&cfg.access_point)?;
    tokio::spawn(network::monitor_stations(stations));

    let addr = cfg.socket_addr()?;
    let listener = server::create_listener(addr, cfg.effective_backlog())?;

    let state = Arc::new(AppState::new(cfg));
    logger::log_server_start(&addr, &state.config);

    let signals = Arc::new(SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals))?;

    server::run_server(listener, state, Arc::clone(&signals.shutdown)).await
}
