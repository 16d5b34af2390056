//! Logger module
//!
//! Provides logging utilities for the listener including:
//! - Socket lifecycle logging (created, bound, listening, closed)
//! - Per-connection events with optional payload echo
//! - Error and warning logging carrying platform error codes
//! - File-based logging support

mod format;
pub mod writer;

pub use format::EventRecord;

use std::io;
use std::net::SocketAddr;
use std::sync::OnceLock;

use crate::config::{Config, LogFormat, LogLevel, LoggingConfig, Strategy};
use crate::server::ServerEvent;

/// Filtering and layout settings, fixed at startup
#[derive(Debug, Clone, Copy)]
struct LogSettings {
    level: LogLevel,
    format: LogFormat,
    log_payload: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Text,
            log_payload: true,
        }
    }
}

static SETTINGS: OnceLock<LogSettings> = OnceLock::new();

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> io::Result<()> {
    writer::init(
        config.info_log_file.as_deref(),
        config.error_log_file.as_deref(),
    )?;
    SETTINGS
        .set(LogSettings {
            level: config.level,
            format: config.format,
            log_payload: config.log_payload,
        })
        .map_err(|_| io::Error::new(io::ErrorKind::AlreadyExists, "Logger already initialized"))
}

fn settings() -> LogSettings {
    SETTINGS.get().copied().unwrap_or_default()
}

/// Write to info log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Filter, format and route one record; warnings go to the error log
fn write(record: &EventRecord) {
    let settings = settings();
    if record.level > settings.level {
        return;
    }
    let line = record.format(settings.format);
    if record.level <= LogLevel::Warn {
        write_error(&line);
    } else {
        write_info(&line);
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write(
        &EventRecord::new(LogLevel::Info, "tcp logger started")
            .field("addr", addr.to_string())
            .field("strategy", config.server.strategy.as_str())
            .field("max_connections", config.server.max_connections)
            .field("read_chunk", config.server.read_chunk),
    );
    if let Some(workers) = config.server.workers {
        write(&EventRecord::new(LogLevel::Info, "worker threads").field("workers", workers));
    }
}

/// Dump the effective configuration at debug level
pub fn log_effective_config(config: &Config) {
    match toml::to_string(config) {
        Ok(rendered) => {
            for line in rendered.lines().filter(|l| !l.is_empty()) {
                write(&EventRecord::new(LogLevel::Debug, line).scope("config"));
            }
        }
        Err(e) => log_warning(&format!("Unable to render configuration: {e}")),
    }
}

pub fn log_socket_created(addr: &SocketAddr) {
    write(
        &EventRecord::new(LogLevel::Info, "socket created")
            .scope("listener")
            .field("addr", addr.to_string()),
    );
}

pub fn log_socket_bound(addr: &SocketAddr) {
    write(
        &EventRecord::new(LogLevel::Info, "socket bound")
            .scope("listener")
            .field("addr", addr.to_string()),
    );
}

pub fn log_socket_listening(addr: &SocketAddr, backlog: i32) {
    write(
        &EventRecord::new(LogLevel::Info, "socket listening")
            .scope("listener")
            .field("addr", addr.to_string())
            .field("backlog", backlog),
    );
}

pub fn log_dispatcher_start(strategy: Strategy, addr: &SocketAddr) {
    write(
        &EventRecord::new(LogLevel::Info, "dispatcher running")
            .scope("listener")
            .field("strategy", strategy.as_str())
            .field("addr", addr.to_string()),
    );
}

/// Current size of the multiplexed readiness set
pub fn log_readiness_set(len: usize) {
    write(
        &EventRecord::new(LogLevel::Debug, "readiness set updated")
            .scope("multiplexed")
            .field("connections", len),
    );
}

/// Log one connection lifecycle event
pub fn log_event(event: &ServerEvent) {
    write(&event_record(event, settings().log_payload));
}

/// Build the record for a lifecycle event; received bytes are attached
/// only when `log_payload` is set
pub fn event_record(event: &ServerEvent, log_payload: bool) -> EventRecord {
    match event {
        ServerEvent::Connected { id, peer } => {
            EventRecord::new(LogLevel::Info, "a new client is connected")
                .scope(id)
                .field("peer", peer.to_string())
        }
        ServerEvent::Received { id, bytes } => {
            let record = EventRecord::new(LogLevel::Info, format!("received {} bytes", bytes.len()))
                .scope(id)
                .field("bytes", bytes.len());
            if log_payload {
                record.field("payload", String::from_utf8_lossy(bytes).into_owned())
            } else {
                record
            }
        }
        ServerEvent::Closed { id } => {
            EventRecord::new(LogLevel::Info, "connection closed").scope(id)
        }
        ServerEvent::Failed {
            id,
            kind,
            os_code,
            message,
        } => EventRecord::new(LogLevel::Error, "recv failed")
            .scope(id)
            .field("errno", *os_code)
            .field("kind", format!("{kind:?}"))
            .field("error", message.as_str()),
        ServerEvent::Refused {
            peer,
            active,
            limit,
        } => EventRecord::new(LogLevel::Warn, "max connections reached, connection refused")
            .scope("listener")
            .field("peer", peer.to_string())
            .field("active", *active)
            .field("limit", *limit),
        ServerEvent::AcceptFailed { os_code, message } => {
            EventRecord::new(LogLevel::Error, "unable to accept connection")
                .scope("listener")
                .field("errno", *os_code)
                .field("error", message.as_str())
        }
    }
}

pub fn log_signal_handlers_registered(pid: u32) {
    write(
        &EventRecord::new(LogLevel::Info, "signal handlers registered (SIGTERM, SIGINT)")
            .scope("signal")
            .field("pid", pid),
    );
}

pub fn log_signal(signal: &str) {
    write(
        &EventRecord::new(LogLevel::Info, "shutdown requested")
            .scope("signal")
            .field("signal", signal),
    );
}

pub fn log_shutdown(addr: &SocketAddr, active: usize) {
    write(
        &EventRecord::new(LogLevel::Info, "listening socket closed")
            .scope("listener")
            .field("addr", addr.to_string())
            .field("active_connections", active),
    );
}

pub fn log_access_point_ready(ssid: &str, auth: &str, max_stations: u8, channel: u8) {
    write(
        &EventRecord::new(LogLevel::Info, "access point configured")
            .scope("wifi")
            .field("ssid", ssid)
            .field("auth", auth)
            .field("max_stations", max_stations)
            .field("channel", channel),
    );
}

pub fn log_station(joined: bool, mac: &str, aid: u16) {
    write(&station_record(joined, mac, aid));
}

pub fn station_record(joined: bool, mac: &str, aid: u16) -> EventRecord {
    let message = if joined { "station joined" } else { "station left" };
    EventRecord::new(LogLevel::Info, message)
        .scope("wifi")
        .field("mac", mac)
        .field("aid", aid)
}

pub fn log_error(message: &str) {
    write(&EventRecord::new(LogLevel::Error, message));
}

pub fn log_warning(message: &str) {
    write(&EventRecord::new(LogLevel::Warn, message));
}
