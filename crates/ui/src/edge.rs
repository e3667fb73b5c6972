//! Button edge detection.

use platform::{Button, ButtonSample};

/// Turns raw per-iteration button samples into discrete press events.
///
/// A press is actionable only on the transition from no buttons held to
/// exactly one button held. Held buttons never repeat, and chords are
/// ignored outright.
#[derive(Debug, Default)]
pub struct EdgeDetector {
    last: ButtonSample,
}

impl EdgeDetector {
    /// Detector that treats the first sample as following an idle state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current sample; returns the button that just went down,
    /// if this sample is an actionable edge.
    pub fn update(&mut self, sample: ButtonSample) -> Option<Button> {
        let event = if self.last.any() {
            None
        } else {
            sample.single_press()
        };
        self.last = sample;
        event
    }
}
