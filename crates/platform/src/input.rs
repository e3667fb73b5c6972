//! Front-panel button input.
//!
//! The pad is sampled once per main-loop iteration; press edges are derived
//! by the `ui` crate from consecutive samples, never stored here.

/// Physical buttons, numbered by board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Top-left.
    One,
    /// Top-right.
    Two,
    /// Bottom-left.
    Three,
    /// Bottom-right.
    Four,
}

/// One debounced sample of all four buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonSample {
    /// Button 1 held.
    pub b1: bool,
    /// Button 2 held.
    pub b2: bool,
    /// Button 3 held.
    pub b3: bool,
    /// Button 4 held.
    pub b4: bool,
}

impl ButtonSample {
    /// At least one button held.
    #[must_use]
    pub fn any(&self) -> bool {
        self.b1 || self.b2 || self.b3 || self.b4
    }

    /// Number of buttons held.
    #[must_use]
    pub fn pressed_count(&self) -> u8 {
        u8::from(self.b1) + u8::from(self.b2) + u8::from(self.b3) + u8::from(self.b4)
    }

    /// The held button, when exactly one is held.
    #[must_use]
    pub fn single_press(&self) -> Option<Button> {
        if self.pressed_count() != 1 {
            return None;
        }
        if self.b1 {
            Some(Button::One)
        } else if self.b2 {
            Some(Button::Two)
        } else if self.b3 {
            Some(Button::Three)
        } else {
            Some(Button::Four)
        }
    }
}

/// Button pad collaborator.
pub trait ButtonPad {
    /// Sample the current (debounced) state of all four buttons.
    fn sample(&mut self) -> ButtonSample;
}
