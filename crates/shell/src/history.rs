//! Bounded ring of recent reply/log lines.
//!
//! While the remote channel is down, replies still land here; the remote
//! task drains the ring the next time a connection comes up so short
//! outages lose nothing.

use chrono::NaiveDateTime;

/// Stored lines are truncated to this length.
pub const HISTORY_LINE_LEN: usize = 96;

const HISTORY_CAP: usize = 16;

/// One retained line with the wall-clock time it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLine {
    /// When the line was pushed.
    pub at: NaiveDateTime,
    /// The line text, truncated at [`HISTORY_LINE_LEN`].
    pub text: heapless::String<HISTORY_LINE_LEN>,
}

/// FIFO ring; pushing past capacity evicts the oldest line.
#[derive(Debug, Default)]
pub struct History {
    lines: heapless::Deque<HistoryLine, HISTORY_CAP>,
}

impl History {
    /// Empty ring.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Retain a line, evicting the oldest when full.
    pub fn push(&mut self, at: NaiveDateTime, text: &str) {
        let mut stored = heapless::String::new();
        for c in text.chars() {
            if stored.push(c).is_err() {
                break;
            }
        }
        let line = HistoryLine { at, text: stored };
        if self.lines.push_back(line.clone()).is_err() {
            self.lines.pop_front();
            let _ = self.lines.push_back(line);
        }
    }

    /// Remove and return the oldest retained line.
    pub fn pop(&mut self) -> Option<HistoryLine> {
        self.lines.pop_front()
    }

    /// Number of retained lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the ring is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
