//! Background tasks sharing the radio through the session arbiter.
//!
//! Each task is a thin loop around an independently testable step; wake
//! times come from `net::schedule` so a slow fetch or missed wake
//! self-corrects at the next clock boundary.

use core::fmt::Write;

use chrono::Timelike;
use embassy_time::{Duration, Timer};
use net::{schedule, WeatherStore, WifiArbiter};
use platform::{NetworkLink, RemoteChannel, Rtc, SharedRtc};
use shell::{is_own_echo, History};

use crate::shared::{RemotePipe, SharedSettings};

/// Retry interval when the clock itself cannot be read to compute the
/// proper wake time.
const FALLBACK_RETRY_SECS: u64 = 3600;
const BURST_CONNECT_ATTEMPTS: usize = 3;
const BURST_SERVICE_POLLS: usize = 20;

// Host test builds sleep against real time, so the burst delays shrink
// there.
#[cfg(not(test))]
const BURST_RETRY_DELAY: Duration = Duration::from_secs(2);
#[cfg(test)]
const BURST_RETRY_DELAY: Duration = Duration::from_millis(5);
#[cfg(not(test))]
const REMOTE_POLL_PERIOD: Duration = Duration::from_millis(500);
#[cfg(test)]
const REMOTE_POLL_PERIOD: Duration = Duration::from_millis(5);

/// One network time sync: session up, fetch, write the shared clock,
/// session down. Failures are logged and swallowed; stale time beats a
/// wedged task.
pub async fn time_sync_step<N: NetworkLink, R: Rtc>(
    arbiter: &WifiArbiter<N>,
    rtc: &SharedRtc<R>,
) -> bool {
    if !arbiter.start_session().await {
        return false;
    }
    let result = arbiter.link().await.sync_time().await;
    let ok = match result {
        Ok(t) => match rtc.set_time(t) {
            Ok(()) => {
                log::info!("time synced: {:02}:{:02}:{:02}", t.hour(), t.minute(), t.second());
                true
            }
            Err(err) => {
                log::warn!("clock write after sync failed: {err:?}");
                false
            }
        },
        Err(err) => {
            log::warn!("time sync failed: {err:?}");
            false
        }
    };
    arbiter.end_session().await;
    ok
}

/// Daily time sync at local midnight.
pub async fn time_sync_task<N: NetworkLink, R: Rtc>(
    arbiter: &WifiArbiter<N>,
    rtc: &SharedRtc<R>,
) {
    loop {
        let secs = rtc
            .now()
            .map(schedule::secs_to_midnight)
            .unwrap_or(FALLBACK_RETRY_SECS);
        Timer::after(Duration::from_secs(secs)).await;
        let _ = time_sync_step(arbiter, rtc).await;
    }
}

/// One weather fetch-and-publish with the given units.
pub async fn weather_fetch<N: NetworkLink>(
    arbiter: &WifiArbiter<N>,
    store: &WeatherStore,
    units: platform::Units,
) -> bool {
    if !arbiter.start_session().await {
        return false;
    }
    let result = arbiter.link().await.fetch_weather(units).await;
    let ok = match result {
        Ok(data) => {
            store.publish(data);
            true
        }
        Err(err) => {
            // Keep the stale value; `valid` already reflects its age.
            log::warn!("weather fetch failed: {err:?}");
            false
        }
    };
    arbiter.end_session().await;
    ok
}

/// Weather refresh honoring the feature toggle and units setting.
pub async fn weather_step<N: NetworkLink>(
    arbiter: &WifiArbiter<N>,
    store: &WeatherStore,
    settings: &SharedSettings,
) -> bool {
    let (enabled, units) = settings.with(|s| (s.weather_enabled, s.units));
    if !enabled {
        return false;
    }
    weather_fetch(arbiter, store, units).await
}

/// Half-hourly weather refresh.
pub async fn weather_task<N: NetworkLink, R: Rtc>(
    arbiter: &WifiArbiter<N>,
    store: &WeatherStore,
    settings: &SharedSettings,
    rtc: &SharedRtc<R>,
) {
    loop {
        let secs = rtc
            .now()
            .map(schedule::secs_to_half_hour)
            .unwrap_or(FALLBACK_RETRY_SECS);
        Timer::after(Duration::from_secs(secs)).await;
        let _ = weather_step(arbiter, store, settings).await;
    }
}

/// Move queued replies into the history ring, stamped with the current
/// wall-clock time.
fn stash_replies<R: Rtc>(pipe: &RemotePipe, history: &mut History, rtc: &SharedRtc<R>) {
    let now = rtc.now().unwrap_or_default();
    while let Some(line) = pipe.take_reply() {
        history.push(now, &line);
    }
}

/// One connected service pass: flush retained replies oldest-first, then
/// forward inbound lines, dropping the clock's own echoes.
pub(crate) async fn service_once<M: RemoteChannel>(
    remote: &mut M,
    pipe: &RemotePipe,
    history: &mut History,
) {
    while let Some(line) = history.pop() {
        let mut out = heapless::String::<128>::new();
        let _ = write!(
            out,
            "[{:02}:{:02}:{:02}] {}",
            line.at.hour(),
            line.at.minute(),
            line.at.second(),
            line.text
        );
        if remote.send(&out).await.is_err() {
            log::warn!("remote send failed, dropping retained line");
            break;
        }
    }
    while let Some(line) = remote.poll_line().await {
        if is_own_echo(&line) {
            continue;
        }
        pipe.push_command(line);
    }
}

/// One half-hour remote burst: bounded connect retries, a bounded service
/// window, then disconnect.
pub async fn remote_burst<M: RemoteChannel, N: NetworkLink, R: Rtc>(
    remote: &mut M,
    arbiter: &WifiArbiter<N>,
    rtc: &SharedRtc<R>,
    pipe: &RemotePipe,
    history: &mut History,
) -> bool {
    let mut connected = false;
    for _ in 0..BURST_CONNECT_ATTEMPTS {
        if arbiter.start_session().await {
            connected = true;
            break;
        }
        Timer::after(BURST_RETRY_DELAY).await;
    }
    if !connected {
        return false;
    }
    for _ in 0..BURST_SERVICE_POLLS {
        stash_replies(pipe, history, rtc);
        service_once(remote, pipe, history).await;
        Timer::after(REMOTE_POLL_PERIOD).await;
    }
    arbiter.end_session().await;
    true
}

async fn persistent_service<M: RemoteChannel, N: NetworkLink, R: Rtc>(
    remote: &mut M,
    arbiter: &WifiArbiter<N>,
    rtc: &SharedRtc<R>,
    settings: &SharedSettings,
    pipe: &RemotePipe,
    history: &mut History,
) {
    if !arbiter.start_session().await {
        Timer::after(Duration::from_secs(30)).await;
        return;
    }
    while settings.with(|s| s.wifi_persistent) {
        stash_replies(pipe, history, rtc);
        service_once(remote, pipe, history).await;
        Timer::after(REMOTE_POLL_PERIOD).await;
    }
    arbiter.end_session().await;
}

/// Remote command channel task. In persistent mode the session stays open
/// and lines are serviced continuously; otherwise the channel bursts on
/// the half-hour cadence. Replies queued while offline accumulate in the
/// history ring and flush on the next connect.
pub async fn remote_task<M: RemoteChannel, N: NetworkLink, R: Rtc>(
    mut remote: M,
    arbiter: &WifiArbiter<N>,
    rtc: &SharedRtc<R>,
    settings: &SharedSettings,
    pipe: &RemotePipe,
) {
    let mut history = History::new();
    loop {
        stash_replies(pipe, &mut history, rtc);
        if settings.with(|s| s.wifi_persistent) {
            persistent_service(&mut remote, arbiter, rtc, settings, pipe, &mut history).await;
            continue;
        }
        let mut remaining = rtc
            .now()
            .map(schedule::secs_to_half_hour)
            .unwrap_or(FALLBACK_RETRY_SECS);
        // Wake each second to stamp replies into the ring and to notice a
        // switch into persistent mode.
        while remaining > 0 && !settings.with(|s| s.wifi_persistent) {
            Timer::after(Duration::from_secs(1)).await;
            stash_replies(pipe, &mut history, rtc);
            remaining -= 1;
        }
        if settings.with(|s| s.wifi_persistent) {
            continue;
        }
        let _ = remote_burst(&mut remote, arbiter, rtc, pipe, &mut history).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::shared::ReplyLine;
    use fakes::{dt, FakeLink, FakeRemote, FakeRtc, LinkCall};
    use settings::UserSettings;

    #[tokio::test]
    async fn test_time_sync_step_writes_shared_clock() {
        let mut link = FakeLink::new();
        let synced = dt(2025, 3, 2, 3, 0, 5);
        link.time_script.push_back(Ok(synced));
        let arbiter = WifiArbiter::new(link);
        let rtc = SharedRtc::new(FakeRtc::at(dt(2025, 3, 2, 2, 59, 0)));

        assert!(time_sync_step(&arbiter, &rtc).await);
        assert_eq!(rtc.now().unwrap(), synced);
        assert_eq!(arbiter.session_count().await, 0);
        assert!(!arbiter.is_connected().await);
    }

    #[tokio::test]
    async fn test_time_sync_failure_balances_sessions() {
        let arbiter = WifiArbiter::new(FakeLink::new());
        let rtc = SharedRtc::new(FakeRtc::at(dt(2025, 3, 2, 2, 59, 0)));

        assert!(!time_sync_step(&arbiter, &rtc).await);
        assert_eq!(arbiter.session_count().await, 0);
        assert!(!arbiter.is_connected().await);
    }

    #[tokio::test]
    async fn test_weather_step_skipped_when_disabled() {
        let arbiter = WifiArbiter::new(FakeLink::new());
        let store = WeatherStore::new();
        let mut settings = UserSettings::default();
        settings.weather_enabled = false;
        let shared = SharedSettings::new(settings);

        assert!(!weather_step(&arbiter, &store, &shared).await);
        assert!(arbiter.link().await.calls.is_empty(), "radio untouched");
    }

    #[tokio::test]
    async fn test_weather_fetch_publishes_and_keeps_stale_on_failure() {
        let mut link = FakeLink::new();
        let mut data = platform::WeatherData::invalid();
        data.temperature = 19.0;
        data.valid = true;
        link.weather_script.push_back(Ok(data));
        let arbiter = WifiArbiter::new(link);
        let store = WeatherStore::new();

        assert!(weather_fetch(&arbiter, &store, platform::Units::Celsius).await);
        assert!(store.get().valid);
        assert_eq!(
            arbiter.link().await.calls[1],
            LinkCall::FetchWeather(platform::Units::Celsius)
        );

        // Script exhausted: the next fetch fails but the published value
        // stays.
        assert!(!weather_fetch(&arbiter, &store, platform::Units::Celsius).await);
        assert!(store.get().valid);
    }

    #[tokio::test]
    async fn test_service_once_flushes_history_in_order() {
        let mut remote = FakeRemote::new();
        let pipe = RemotePipe::new();
        let mut history = History::new();
        history.push(dt(2025, 3, 2, 8, 15, 0), "[CLK]: alarm set to 07:30.");
        history.push(dt(2025, 3, 2, 8, 16, 2), "[CLK]: volume set to 12.");

        service_once(&mut remote, &pipe, &mut history).await;
        assert_eq!(remote.sent.len(), 2);
        assert_eq!(remote.sent[0], "[08:15:00] [CLK]: alarm set to 07:30.");
        assert_eq!(remote.sent[1], "[08:16:02] [CLK]: volume set to 12.");
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_remote_burst_gives_up_when_connects_exhaust() {
        let mut link = FakeLink::new();
        link.connect_script.extend([false, false, false]);
        let arbiter = WifiArbiter::new(link);
        let rtc = SharedRtc::new(FakeRtc::at(dt(2025, 3, 2, 8, 0, 0)));
        let pipe = RemotePipe::new();
        let mut history = History::new();
        let mut remote = FakeRemote::new();

        assert!(!remote_burst(&mut remote, &arbiter, &rtc, &pipe, &mut history).await);
        assert_eq!(arbiter.session_count().await, 0);
        assert!(remote.sent.is_empty(), "nothing serviced without a link");
        let link = arbiter.link().await;
        assert_eq!(link.connects(), BURST_CONNECT_ATTEMPTS);
        assert!(!link.connected);
    }

    #[tokio::test]
    async fn test_remote_burst_services_lines_then_disconnects() {
        let arbiter = WifiArbiter::new(FakeLink::new());
        let rtc = SharedRtc::new(FakeRtc::at(dt(2025, 3, 2, 8, 30, 0)));
        let pipe = RemotePipe::new();
        pipe.push_reply(ReplyLine::try_from("[CLK]: alarm set to 07:30.").unwrap());
        let mut history = History::new();
        let mut remote = FakeRemote::new();
        remote.push_line("status");

        assert!(remote_burst(&mut remote, &arbiter, &rtc, &pipe, &mut history).await);
        assert_eq!(pipe.take_command().unwrap().as_str(), "status");
        assert_eq!(remote.sent, vec!["[08:30:00] [CLK]: alarm set to 07:30."]);
        assert!(history.is_empty(), "retained reply flushed");
        assert_eq!(arbiter.session_count().await, 0);
        assert!(!arbiter.is_connected().await);
        assert_eq!(arbiter.link().await.disconnects(), 1);
    }

    #[tokio::test]
    async fn test_service_once_suppresses_own_echo() {
        let mut remote = FakeRemote::new();
        remote.push_line("[CLK]: volume set to 12.");
        remote.push_line("status");
        let pipe = RemotePipe::new();
        let mut history = History::new();

        service_once(&mut remote, &pipe, &mut history).await;
        let inbound = pipe.take_command().unwrap();
        assert_eq!(inbound.as_str(), "status");
        assert!(pipe.take_command().is_none(), "echo was dropped");
    }
}
