//! Network collaborators: the Wi-Fi radio link and the remote command pipe.
//!
//! Transport details (HTTP, JSON, NTP, the remote broker protocol) belong to
//! the implementations. The core only sees validated results or errors.

use chrono::NaiveDateTime;
use embassy_time::Duration;

/// Temperature units for weather retrieval and display. A configuration
/// knob, not a guess: the upstream API serves either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Units {
    /// Metric (°C).
    #[default]
    Celsius,
    /// Imperial (°F).
    Fahrenheit,
}

/// Current-conditions snapshot from the weather service.
///
/// Replaced wholesale on each successful fetch. A failed fetch keeps the
/// previous (stale) value; `valid == false` is the only honest sentinel for
/// "do not trust these fields".
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WeatherData {
    /// Current temperature, in the units it was fetched with.
    pub temperature: f32,
    /// Forecast minimum.
    pub temp_min: f32,
    /// Forecast maximum.
    pub temp_max: f32,
    /// Relative humidity, percent.
    pub humidity: u8,
    /// Human-readable description ("scattered clouds").
    pub description: heapless::String<48>,
    /// Coarse condition class ("Clear", "Clouds", "Rain").
    pub condition: heapless::String<16>,
    /// False until the first successful fetch.
    pub valid: bool,
}

impl WeatherData {
    /// The boot-time placeholder: all zeros, not valid.
    #[must_use]
    pub const fn invalid() -> Self {
        Self {
            temperature: 0.0,
            temp_min: 0.0,
            temp_max: 0.0,
            humidity: 0,
            description: heapless::String::new(),
            condition: heapless::String::new(),
            valid: false,
        }
    }
}

/// Wi-Fi radio collaborator.
///
/// Exclusive access is arbitrated by `net::WifiArbiter`; implementations do
/// not need their own locking.
pub trait NetworkLink {
    /// Error type.
    type Error: core::fmt::Debug;

    /// Bring the radio up and associate, bounded by `timeout`.
    async fn connect(&mut self, timeout: Duration) -> Result<(), Self::Error>;

    /// Tear the radio down.
    async fn disconnect(&mut self);

    /// Fetch and validate current weather. Implementations must reject
    /// responses with absent or wrong-typed fields.
    async fn fetch_weather(&mut self, units: Units) -> Result<WeatherData, Self::Error>;

    /// Retrieve network time (NTP), bounded by the implementation's own
    /// timeout. The caller writes the result to the hardware clock.
    async fn sync_time(&mut self) -> Result<NaiveDateTime, Self::Error>;
}

/// Remote command channel (cloud pin/stream transport).
///
/// Only usable while a Wi-Fi session is active.
pub trait RemoteChannel {
    /// Error type.
    type Error: core::fmt::Debug;

    /// Poll for one pending inbound command line. Must return promptly.
    async fn poll_line(&mut self) -> Option<heapless::String<128>>;

    /// Publish a reply or log line.
    async fn send(&mut self, line: &str) -> Result<(), Self::Error>;
}
