//! Serial byte-to-line accumulator.

/// Input lines longer than this are discarded wholesale.
pub const MAX_LINE_LEN: usize = 128;

/// What a fed byte produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// A complete non-empty line (terminator stripped).
    Line(heapless::String<MAX_LINE_LEN>),
    /// The line exceeded [`MAX_LINE_LEN`]; the buffer was reset and the
    /// rest of the oversized line will be swallowed up to its terminator.
    Overflow,
}

/// Accumulates serial bytes into lines. CR and LF both terminate;
/// CRLF yields one line, not two, because the empty follow-up is dropped.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: heapless::String<MAX_LINE_LEN>,
    discarding: bool,
}

impl LineBuffer {
    /// Empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one received byte.
    pub fn push(&mut self, byte: u8) -> Option<LineEvent> {
        match byte {
            b'\r' | b'\n' => {
                self.discarding = false;
                if self.buf.is_empty() {
                    return None;
                }
                let line = core::mem::take(&mut self.buf);
                Some(LineEvent::Line(line))
            }
            _ if self.discarding => None,
            _ => {
                if self.buf.push(char::from(byte)).is_err() {
                    self.buf.clear();
                    self.discarding = true;
                    return Some(LineEvent::Overflow);
                }
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn feed(lb: &mut LineBuffer, text: &str) -> Vec<LineEvent> {
        text.bytes().filter_map(|b| lb.push(b)).collect()
    }

    #[test]
    fn test_crlf_yields_single_line() {
        let mut lb = LineBuffer::new();
        let events = feed(&mut lb, "status\r\n");
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], LineEvent::Line(l) if l.as_str() == "status"));
    }

    #[test]
    fn test_blank_lines_ignored() {
        let mut lb = LineBuffer::new();
        assert!(feed(&mut lb, "\n\n\r\n").is_empty());
    }

    #[test]
    fn test_overflow_resets_and_swallows_remainder() {
        let mut lb = LineBuffer::new();
        let long = "x".repeat(200);
        let events = feed(&mut lb, &long);
        assert_eq!(events, vec![LineEvent::Overflow]);
        // The tail of the oversized line is discarded, the next line is clean.
        let events = feed(&mut lb, "\nstatus\n");
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], LineEvent::Line(l) if l.as_str() == "status"));
    }

    #[test]
    fn test_exact_capacity_line_accepted() {
        let mut lb = LineBuffer::new();
        let line = "y".repeat(MAX_LINE_LEN);
        let mut events = feed(&mut lb, &line);
        assert!(events.is_empty());
        events = feed(&mut lb, "\n");
        assert!(matches!(&events[0], LineEvent::Line(l) if l.len() == MAX_LINE_LEN));
    }
}
