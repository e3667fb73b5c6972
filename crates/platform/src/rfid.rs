//! RFID reader abstraction and UID formatting.

use core::fmt::Write as _;

/// Defensive UID length bound. A malformed or noisy read must never produce
/// unbounded output.
pub const MAX_UID_LEN: usize = 10;

/// Raw UID bytes, bounded at [`MAX_UID_LEN`].
pub type Uid = heapless::Vec<u8, MAX_UID_LEN>;

/// Canonical uppercase-hex UID string (two characters per byte).
pub type UidString = heapless::String<20>;

/// Classified card event, as consumed by the alarm dismissal path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RfidEvent {
    /// No new card present.
    None,
    /// The configured alarm-dismiss card.
    AlarmCard,
    /// Any other card.
    UnknownCard,
}

/// RFID reader collaborator.
pub trait RfidReader {
    /// Error type.
    type Error: core::fmt::Debug;

    /// Boot-time self test (version register read or equivalent).
    fn online(&mut self) -> bool;

    /// Whether a new card entered the field since the last read. Must not
    /// block; the main loop polls this every iteration.
    fn card_present(&mut self) -> bool;

    /// Read the UID of the present card.
    fn read_uid(&mut self) -> Result<Uid, Self::Error>;

    /// Halt/deselect the card. Called after every read, match or not, so
    /// the reader is never left in a locked state.
    fn halt(&mut self);
}

/// Format UID bytes as canonical uppercase hex with leading zeros
/// preserved: `[0x04, 0x1A]` becomes `"041A"`.
///
/// Input beyond [`MAX_UID_LEN`] bytes is ignored.
#[must_use]
pub fn format_uid(bytes: &[u8]) -> UidString {
    let mut out = UidString::new();
    for b in bytes.iter().take(MAX_UID_LEN) {
        // Cannot overflow: 10 bytes * 2 chars fits the 20-char capacity.
        let _ = write!(out, "{b:02X}");
    }
    out
}
