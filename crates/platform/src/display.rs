//! Display surface abstraction.
//!
//! The clockface is divided into disjoint regions (time, date, weather,
//! alarm status); each draw operation touches only its own region so the
//! main loop and the weather task may redraw concurrently without tearing.
//! Pixel-level layout is the implementation's business.

use chrono::NaiveDateTime;

use crate::net::{Units, WeatherData};
use crate::rtc::AlarmTime;

/// Full-screen flash colors for card feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashColor {
    /// Alarm dismissed.
    Red,
    /// Setting changed.
    Green,
    /// Unknown card.
    Yellow,
}

/// Boot-banner line severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Severity {
    /// Normal progress.
    Info,
    /// Degraded but continuing.
    Warn,
    /// Component not responding.
    Error,
}

/// One rendered settings-menu row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuLine<'a> {
    /// Item label.
    pub label: &'a str,
    /// Formatted current value; empty for submenu/action rows.
    pub value: heapless::String<24>,
}

/// Display collaborator.
pub trait Clockface {
    /// Clear the whole screen.
    fn clear(&mut self);

    /// Redraw the time region.
    fn draw_time(&mut self, now: NaiveDateTime, use_24h: bool);

    /// Redraw the date region.
    fn draw_date(&mut self, now: NaiveDateTime);

    /// Redraw the weather region.
    fn draw_weather(&mut self, weather: &WeatherData, units: Units);

    /// Redraw the alarm-status region.
    fn draw_alarm_status(&mut self, alarm: &AlarmTime, ringing: bool);

    /// Draw the settings menu (replaces the whole screen while in
    /// settings mode).
    fn draw_menu(&mut self, title: &str, lines: &[MenuLine<'_>], selected: usize, editing: bool);

    /// Append a boot-banner progress line.
    fn boot_line(&mut self, severity: Severity, text: &str);

    /// Flash the screen for card feedback; the caller restores the regions
    /// afterwards.
    fn flash(&mut self, color: FlashColor, ms: u16);

    /// Set backlight brightness (0-255).
    fn set_brightness(&mut self, level: u8);
}
