//! Access point bring-up.
//!
//! The listener is reached through a soft access point. Real radio
//! provisioning belongs to the platform; this module owns the parts that
//! are platform independent: validating the configuration, deciding the
//! authentication mode, and reporting station activity.

use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::AccessPointConfig;
use crate::logger;

const MAX_SSID_LEN: usize = 32;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 63;
const MAX_STATIONS: u8 = 10;
const MAX_CHANNEL: u8 = 13;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NetworkError {
    #[error("access point SSID cannot be empty")]
    EmptySsid,

    #[error("access point SSID is {0} bytes, at most 32 allowed")]
    SsidTooLong(usize),

    #[error("WPA2 password must be 8..=63 bytes, got {0}")]
    InvalidPassword(usize),

    #[error("max_stations must be within 1..=10, got {0}")]
    InvalidStationLimit(u8),

    #[error("channel must be within 1..=13, got {0}")]
    InvalidChannel(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Open,
    Wpa2Personal,
}

impl AuthMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Wpa2Personal => "wpa2-personal",
        }
    }
}

impl AccessPointConfig {
    /// An empty password means an open network
    pub fn auth_mode(&self) -> AuthMode {
        if self.password.is_empty() {
            AuthMode::Open
        } else {
            AuthMode::Wpa2Personal
        }
    }

    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.ssid.is_empty() {
            return Err(NetworkError::EmptySsid);
        }
        if self.ssid.len() > MAX_SSID_LEN {
            return Err(NetworkError::SsidTooLong(self.ssid.len()));
        }
        let pass_len = self.password.len();
        if pass_len != 0 && !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&pass_len) {
            return Err(NetworkError::InvalidPassword(pass_len));
        }
        if !(1..=MAX_STATIONS).contains(&self.max_stations) {
            return Err(NetworkError::InvalidStationLimit(self.max_stations));
        }
        if !(1..=MAX_CHANNEL).contains(&self.channel) {
            return Err(NetworkError::InvalidChannel(self.channel));
        }
        Ok(())
    }
}

/// Receiving end of the station join/leave notifications
pub type StationEvents = mpsc::UnboundedReceiver<StationEvent>;

/// Something that can bring an access point up.
///
/// `start` hands back the stream of station changes; it ends when the
/// platform stops reporting.
pub trait AccessPoint {
    fn start(&self, config: &AccessPointConfig) -> Result<StationEvents, NetworkError>;
}

/// Access point for hosted builds: validates and reports, no radio work.
///
/// No station ever associates, so its event stream is already closed.
#[derive(Debug, Default)]
pub struct HostedAccessPoint;

impl AccessPoint for HostedAccessPoint {
    fn start(&self, config: &AccessPointConfig) -> Result<StationEvents, NetworkError> {
        config.validate()?;
        logger::log_access_point_ready(
            &config.ssid,
            config.auth_mode().as_str(),
            config.max_stations,
            config.channel,
        );
        let (_tx, rx) = mpsc::unbounded_channel();
        Ok(rx)
    }
}

/// Station association changes reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationEvent {
    Joined { mac: MacAddr, aid: u16 },
    Left { mac: MacAddr, aid: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddr(pub [u8; 6]);

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

pub fn handle_station_event(event: &StationEvent) {
    match event {
        StationEvent::Joined { mac, aid } => logger::log_station(true, &mac.to_string(), *aid),
        StationEvent::Left { mac, aid } => logger::log_station(false, &mac.to_string(), *aid),
    }
}

/// Log station changes until the access point stops reporting.
///
/// Returns the number of events handled.
pub async fn monitor_stations(mut events: StationEvents) -> usize {
    let mut handled = 0;
    while let Some(event) = events.recv().await {
        handle_station_event(&event);
        handled += 1;
    }
    handled
}
