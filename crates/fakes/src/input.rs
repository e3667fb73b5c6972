//! Fake button pad, light sensor, and serial port.

use std::collections::VecDeque;

use platform::{ButtonPad, ButtonSample, LightSensor, SerialPort};

/// Scriptable button pad. Queued samples are consumed one per poll; when
/// the queue runs dry, the pad reads as idle.
#[derive(Debug, Default)]
pub struct FakeButtons {
    /// Pending samples.
    pub script: VecDeque<ButtonSample>,
}

impl FakeButtons {
    /// Idle pad.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a sample with exactly one button held.
    pub fn press(&mut self, button: platform::Button) {
        let mut s = ButtonSample::default();
        match button {
            platform::Button::One => s.b1 = true,
            platform::Button::Two => s.b2 = true,
            platform::Button::Three => s.b3 = true,
            platform::Button::Four => s.b4 = true,
        }
        self.script.push_back(s);
    }

    /// Queue an all-released sample (the edge detector needs one between
    /// presses).
    pub fn release(&mut self) {
        self.script.push_back(ButtonSample::default());
    }
}

impl ButtonPad for FakeButtons {
    fn sample(&mut self) -> ButtonSample {
        self.script.pop_front().unwrap_or_default()
    }
}

/// Fixed-value ambient light sensor.
#[derive(Debug)]
pub struct FakeLight {
    /// Raw reading returned by every poll.
    pub level: u16,
}

impl FakeLight {
    /// Sensor pinned at `level`.
    #[must_use]
    pub fn new(level: u16) -> Self {
        Self { level }
    }
}

impl LightSensor for FakeLight {
    fn read(&mut self) -> u16 {
        self.level
    }
}

/// Scriptable serial console.
#[derive(Debug, Default)]
pub struct FakeSerial {
    /// Pending inbound bytes.
    pub inbound: VecDeque<u8>,
    /// Reply lines written by the firmware.
    pub written: Vec<String>,
}

impl FakeSerial {
    /// Quiet port.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an inbound command line with its terminating newline.
    pub fn type_line(&mut self, line: &str) {
        self.inbound.extend(line.bytes());
        self.inbound.push_back(b'\n');
    }
}

impl SerialPort for FakeSerial {
    fn read_byte(&mut self) -> Option<u8> {
        self.inbound.pop_front()
    }

    fn write_line(&mut self, line: &str) {
        self.written.push(line.to_owned());
    }
}
