//! Fake RFID reader fed from a queue of scripted card taps.

use std::collections::VecDeque;

use platform::{RfidReader, Uid};

/// Error for a scripted failed read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadFailed;

/// Scriptable card reader. Each queued UID is reported as one new card.
#[derive(Debug)]
pub struct FakeRfid {
    queue: VecDeque<Uid>,
    current: Option<Uid>,
    /// Number of `halt` calls (must equal the number of reads).
    pub halts: usize,
    /// Boot self-test outcome.
    pub responding: bool,
}

impl Default for FakeRfid {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            current: None,
            halts: 0,
            responding: true,
        }
    }
}

impl FakeRfid {
    /// Reader with no cards in the field.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a card tap. Panics in test code if `bytes` exceeds the UID
    /// bound, which would be a broken test script.
    #[allow(clippy::panic)]
    pub fn present_card(&mut self, bytes: &[u8]) {
        match Uid::from_slice(bytes) {
            Ok(uid) => self.queue.push_back(uid),
            Err(_) => panic!("scripted UID longer than MAX_UID_LEN"),
        }
    }
}

impl RfidReader for FakeRfid {
    type Error = ReadFailed;

    fn online(&mut self) -> bool {
        self.responding
    }

    fn card_present(&mut self) -> bool {
        if self.current.is_none() {
            self.current = self.queue.pop_front();
        }
        self.current.is_some()
    }

    fn read_uid(&mut self) -> Result<Uid, Self::Error> {
        self.current.clone().ok_or(ReadFailed)
    }

    fn halt(&mut self) {
        self.current = None;
        self.halts += 1;
    }
}
