//! Fake network link and remote channel with scripted outcomes.

use std::collections::VecDeque;

use chrono::NaiveDateTime;
use embassy_time::Duration;
use platform::{NetworkLink, RemoteChannel, Units, WeatherData};

/// One recorded link operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkCall {
    /// Connect attempt (successful or not).
    Connect,
    /// Radio teardown.
    Disconnect,
    /// Weather fetch attempt.
    FetchWeather(Units),
    /// Time sync attempt.
    SyncTime,
}

/// Error for a scripted network failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetFailure;

/// Scriptable Wi-Fi radio.
///
/// `connect_script` is consumed front-to-back; when it runs dry, connects
/// succeed. Weather/time results are replayed from their queues, `NetFailure`
/// when empty.
#[derive(Debug, Default)]
pub struct FakeLink {
    /// Scripted connect outcomes.
    pub connect_script: VecDeque<bool>,
    /// Scripted weather fetch results.
    pub weather_script: VecDeque<Result<WeatherData, NetFailure>>,
    /// Scripted time sync results.
    pub time_script: VecDeque<Result<NaiveDateTime, NetFailure>>,
    /// Every call, in order.
    pub calls: Vec<LinkCall>,
    /// Whether the radio is currently up.
    pub connected: bool,
}

impl FakeLink {
    /// A link where every operation succeeds with the queued results.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of connect handshakes attempted.
    #[must_use]
    pub fn connects(&self) -> usize {
        self.calls.iter().filter(|c| **c == LinkCall::Connect).count()
    }

    /// Number of teardowns.
    #[must_use]
    pub fn disconnects(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == LinkCall::Disconnect)
            .count()
    }
}

impl NetworkLink for FakeLink {
    type Error = NetFailure;

    async fn connect(&mut self, _timeout: Duration) -> Result<(), Self::Error> {
        self.calls.push(LinkCall::Connect);
        let ok = self.connect_script.pop_front().unwrap_or(true);
        if ok {
            self.connected = true;
            Ok(())
        } else {
            Err(NetFailure)
        }
    }

    async fn disconnect(&mut self) {
        self.calls.push(LinkCall::Disconnect);
        self.connected = false;
    }

    async fn fetch_weather(&mut self, units: Units) -> Result<WeatherData, Self::Error> {
        self.calls.push(LinkCall::FetchWeather(units));
        self.weather_script.pop_front().unwrap_or(Err(NetFailure))
    }

    async fn sync_time(&mut self) -> Result<NaiveDateTime, Self::Error> {
        self.calls.push(LinkCall::SyncTime);
        self.time_script.pop_front().unwrap_or(Err(NetFailure))
    }
}

/// Scriptable remote command pipe.
#[derive(Debug, Default)]
pub struct FakeRemote {
    /// Pending inbound lines.
    pub inbound: VecDeque<heapless::String<128>>,
    /// Everything published outward.
    pub sent: Vec<String>,
}

impl FakeRemote {
    /// Empty pipe.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an inbound command line (truncated at the transport cap).
    pub fn push_line(&mut self, line: &str) {
        let mut s = heapless::String::new();
        let _ = s.push_str(line);
        self.inbound.push_back(s);
    }
}

impl RemoteChannel for FakeRemote {
    type Error = NetFailure;

    async fn poll_line(&mut self) -> Option<heapless::String<128>> {
        self.inbound.pop_front()
    }

    async fn send(&mut self, line: &str) -> Result<(), Self::Error> {
        self.sent.push(line.to_owned());
        Ok(())
    }
}
