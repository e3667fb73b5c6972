//! Cross-task shared state: the settings snapshot and the remote command
//! pipe.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use settings::UserSettings;
use shell::MAX_LINE_LEN;

/// Settings snapshot readable from any task.
///
/// The main loop is the only writer; it republishes after every settings
/// mutation so the background tasks see the current knobs without touching
/// the store.
pub struct SharedSettings(Mutex<CriticalSectionRawMutex, RefCell<UserSettings>>);

impl SharedSettings {
    /// Seed with boot-time settings (defaults until the store is read).
    pub fn new(settings: UserSettings) -> Self {
        Self(Mutex::new(RefCell::new(settings)))
    }

    /// Run `f` on the current snapshot.
    pub fn with<T>(&self, f: impl FnOnce(&UserSettings) -> T) -> T {
        self.0.lock(|cell| f(&cell.borrow()))
    }

    /// Replace the snapshot.
    pub fn publish(&self, settings: UserSettings) {
        self.0.lock(|cell| {
            *cell.borrow_mut() = settings;
        });
    }
}

/// Inbound command line from the remote transport.
pub type RemoteLine = heapless::String<MAX_LINE_LEN>;
/// Outbound reply line (shell reply capacity).
pub type ReplyLine = heapless::String<512>;

const INBOUND_CAP: usize = 4;
const OUTBOUND_CAP: usize = 8;

/// Bounded queues between the remote task and the main loop.
///
/// The remote task feeds command lines in and carries replies out; when a
/// queue is full the newest line is dropped (bounded-buffer contract, the
/// reply history ring is the longer-term buffer).
pub struct RemotePipe {
    inbound: Channel<CriticalSectionRawMutex, RemoteLine, INBOUND_CAP>,
    outbound: Channel<CriticalSectionRawMutex, ReplyLine, OUTBOUND_CAP>,
}

impl RemotePipe {
    /// Empty pipe.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inbound: Channel::new(),
            outbound: Channel::new(),
        }
    }

    /// Queue an inbound command line (remote task side).
    pub fn push_command(&self, line: RemoteLine) {
        let _ = self.inbound.try_send(line);
    }

    /// Take one pending command line (main loop side).
    pub fn take_command(&self) -> Option<RemoteLine> {
        self.inbound.try_receive().ok()
    }

    /// Queue a reply for the remote transport (main loop side).
    pub fn push_reply(&self, line: ReplyLine) {
        let _ = self.outbound.try_send(line);
    }

    /// Take one pending reply (remote task side).
    pub fn take_reply(&self) -> Option<ReplyLine> {
        self.outbound.try_receive().ok()
    }
}

impl Default for RemotePipe {
    fn default() -> Self {
        Self::new()
    }
}
