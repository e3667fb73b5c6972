//! Reference-counted Wi-Fi session arbiter.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embassy_time::Duration;
use platform::NetworkLink;

/// Bound on the association handshake. Keeps a dead access point from
/// starving the other tasks and the watchdog.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Default, Clone, Copy)]
struct SessionState {
    sessions: u8,
    persistent: bool,
    connected: bool,
}

/// Serializes radio ownership across independent concurrent consumers.
///
/// Invariants:
/// - the session count never goes below zero;
/// - the radio is up iff the count is positive or persistent mode holds it;
/// - count and flag are only touched under the state mutex;
/// - a session started while another is active never re-runs the connect
///   handshake.
pub struct WifiArbiter<L> {
    state: Mutex<CriticalSectionRawMutex, SessionState>,
    link: Mutex<CriticalSectionRawMutex, L>,
}

impl<L: NetworkLink> WifiArbiter<L> {
    /// Arbiter over a radio that starts disconnected.
    pub fn new(link: L) -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            link: Mutex::new(link),
        }
    }

    /// Open a session, bringing the radio up if this is the first one.
    ///
    /// Returns `false` (count untouched) when the bounded connect attempt
    /// fails. The state lock is held across the handshake so two first
    /// sessions cannot race into duplicate connects.
    pub async fn start_session(&self) -> bool {
        let mut state = self.state.lock().await;
        if !state.connected {
            let mut link = self.link.lock().await;
            match link.connect(CONNECT_TIMEOUT).await {
                Ok(()) => state.connected = true,
                Err(err) => {
                    log::warn!("wifi connect failed: {err:?}");
                    return false;
                }
            }
        }
        state.sessions = state.sessions.saturating_add(1);
        true
    }

    /// Close a session; tears the radio down when the last one ends and
    /// persistent mode is off.
    pub async fn end_session(&self) {
        let mut state = self.state.lock().await;
        let Some(remaining) = state.sessions.checked_sub(1) else {
            log::warn!("end_session without a matching start");
            return;
        };
        state.sessions = remaining;
        if remaining == 0 && !state.persistent && state.connected {
            self.link.lock().await.disconnect().await;
            state.connected = false;
        }
    }

    /// Override teardown-on-zero (long-lived interactive sessions).
    /// Turning persistence off with no live session tears the radio down.
    pub async fn set_persistent(&self, on: bool) {
        let mut state = self.state.lock().await;
        state.persistent = on;
        if !on && state.sessions == 0 && state.connected {
            self.link.lock().await.disconnect().await;
            state.connected = false;
        }
    }

    /// Whether persistent mode is set.
    pub async fn is_persistent(&self) -> bool {
        self.state.lock().await.persistent
    }

    /// Whether the radio is currently up.
    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.connected
    }

    /// Live session count (status reporting).
    pub async fn session_count(&self) -> u8 {
        self.state.lock().await.sessions
    }

    /// Non-blocking snapshot of `(sessions, persistent, connected)` for
    /// status reporting from sync code. `None` when the state lock is held.
    pub fn try_status(&self) -> Option<(u8, bool, bool)> {
        let state = self.state.try_lock().ok()?;
        Some((state.sessions, state.persistent, state.connected))
    }

    /// Exclusive access to the radio for a consumer holding a session.
    pub async fn link(&self) -> MutexGuard<'_, CriticalSectionRawMutex, L> {
        self.link.lock().await
    }
}
