//! Ambient backlight controller.
//!
//! Maps the raw light-sensor reading onto a backlight level, with
//! hysteresis so sensor noise does not make the backlight shimmer. Manual
//! mode passes the configured level straight through.

use settings::BrightnessMode;

/// Sensor reading treated as full darkness.
const RAW_DARK: u16 = 200;
/// Sensor reading treated as full daylight.
const RAW_BRIGHT: u16 = 3000;
/// Backlight floor so the clock stays readable at night.
const LEVEL_MIN: u8 = 20;
const LEVEL_MAX: u8 = 255;
/// Minimum level change before the backlight is actually retargeted.
const HYSTERESIS: u8 = 10;

/// Tracks the last applied level and decides when to move it.
#[derive(Debug)]
pub struct BrightnessController {
    current: u8,
}

impl BrightnessController {
    /// Controller starting at the given level (what boot applied).
    #[must_use]
    pub fn new(initial: u8) -> Self {
        Self { current: initial }
    }

    /// Level currently applied to the display.
    #[must_use]
    pub fn current(&self) -> u8 {
        self.current
    }

    /// Compute the next level from the policy and a fresh sensor reading.
    /// Returns `Some(level)` only when the display should be retargeted.
    pub fn update(&mut self, mode: BrightnessMode, raw: u16) -> Option<u8> {
        let target = match mode {
            BrightnessMode::Manual(level) => level,
            BrightnessMode::Auto => Self::map(raw),
        };
        let delta = self.current.abs_diff(target);
        // Manual changes apply exactly; only the sensor path is damped.
        let threshold = match mode {
            BrightnessMode::Manual(_) => 1,
            BrightnessMode::Auto => HYSTERESIS,
        };
        if delta >= threshold {
            self.current = target;
            Some(target)
        } else {
            None
        }
    }

    fn map(raw: u16) -> u8 {
        let clamped = raw.clamp(RAW_DARK, RAW_BRIGHT);
        let span_in = u32::from(RAW_BRIGHT - RAW_DARK);
        let span_out = u32::from(LEVEL_MAX - LEVEL_MIN);
        let scaled = u32::from(clamped - RAW_DARK) * span_out / span_in;
        LEVEL_MIN + scaled as u8
    }
}
