//! Bounded reply buffer.

use core::fmt;

/// Every reply line starts with this tag so operators can tell the
/// clock's output from other traffic on a shared channel, and so the
/// remote task can recognise its own lines coming back.
pub const REPLY_PREFIX: &str = "[CLK]: ";

const REPLY_CAP: usize = 512;

/// A single outgoing reply. Appends past capacity truncate silently;
/// they never corrupt what is already buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply(heapless::String<REPLY_CAP>);

impl Reply {
    /// Fresh reply carrying the standard prefix.
    #[must_use]
    pub fn new() -> Self {
        let mut s = heapless::String::new();
        // Prefix length is far below capacity.
        let _ = s.push_str(REPLY_PREFIX);
        Self(s)
    }

    /// Append as much of `text` as fits.
    pub fn push_str(&mut self, text: &str) {
        for c in text.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
    }

    /// The full reply line.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether anything beyond the prefix has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.len() == REPLY_PREFIX.len()
    }
}

impl Default for Reply {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Write for Reply {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

/// Loopback guard: a line the clock itself published, seen again on the
/// remote channel.
#[must_use]
pub fn is_own_echo(line: &str) -> bool {
    line.trim_start().starts_with(REPLY_PREFIX)
}
