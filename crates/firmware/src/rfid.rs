//! Card poll-and-classify step.

use platform::{format_uid, RfidEvent, RfidReader, UidString};

/// Outcome of one poll: the classified event plus the formatted UID (for
/// logging unknown cards).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfidScan {
    /// Classification against the authorized UID.
    pub event: RfidEvent,
    /// Canonical uppercase-hex UID, when a card was read.
    pub uid: Option<UidString>,
}

/// Polls the reader once per main-loop iteration and classifies taps
/// against the single authorized card.
pub struct RfidPoller {
    authorized: UidString,
}

impl RfidPoller {
    /// Poller recognising `authorized` (canonical uppercase hex).
    pub fn new(authorized: UidString) -> Self {
        Self { authorized }
    }

    /// Non-blocking poll. The reader is halted after every read, match or
    /// not, so a card left on the pad produces one event, not a stream.
    pub fn poll<R: RfidReader>(&self, reader: &mut R) -> RfidScan {
        if !reader.card_present() {
            return RfidScan {
                event: RfidEvent::None,
                uid: None,
            };
        }
        let result = reader.read_uid();
        reader.halt();
        match result {
            Ok(raw) => {
                let uid = format_uid(&raw);
                let event = if uid == self.authorized {
                    RfidEvent::AlarmCard
                } else {
                    RfidEvent::UnknownCard
                };
                RfidScan {
                    event,
                    uid: Some(uid),
                }
            }
            Err(err) => {
                log::warn!("uid read failed: {err:?}");
                RfidScan {
                    event: RfidEvent::None,
                    uid: None,
                }
            }
        }
    }
}
