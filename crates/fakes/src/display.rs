//! Fake display that records region draws.

use chrono::NaiveDateTime;
use platform::{AlarmTime, Clockface, FlashColor, MenuLine, Severity, Units, WeatherData};

/// One recorded display operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayOp {
    /// Whole screen cleared.
    Clear,
    /// Time region redrawn.
    Time(NaiveDateTime, bool),
    /// Date region redrawn.
    Date(NaiveDateTime),
    /// Weather region redrawn.
    Weather(WeatherData),
    /// Alarm-status region redrawn.
    AlarmStatus(AlarmTime, bool),
    /// Settings menu drawn (title, selected row, editing).
    Menu(String, usize, bool),
    /// Boot banner line.
    BootLine(Severity, String),
    /// Feedback flash.
    Flash(FlashColor),
    /// Backlight level change.
    Brightness(u8),
}

/// Recording display.
#[derive(Debug, Default)]
pub struct FakeDisplay {
    /// Every operation, in order.
    pub ops: Vec<DisplayOp>,
}

impl FakeDisplay {
    /// Blank screen.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count operations matching `pred`.
    pub fn count(&self, pred: impl Fn(&DisplayOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    /// The most recent operation, if any.
    #[must_use]
    pub fn last(&self) -> Option<&DisplayOp> {
        self.ops.last()
    }
}

impl Clockface for FakeDisplay {
    fn clear(&mut self) {
        self.ops.push(DisplayOp::Clear);
    }

    fn draw_time(&mut self, now: NaiveDateTime, use_24h: bool) {
        self.ops.push(DisplayOp::Time(now, use_24h));
    }

    fn draw_date(&mut self, now: NaiveDateTime) {
        self.ops.push(DisplayOp::Date(now));
    }

    fn draw_weather(&mut self, weather: &WeatherData, _units: Units) {
        self.ops.push(DisplayOp::Weather(weather.clone()));
    }

    fn draw_alarm_status(&mut self, alarm: &AlarmTime, ringing: bool) {
        self.ops.push(DisplayOp::AlarmStatus(*alarm, ringing));
    }

    fn draw_menu(&mut self, title: &str, _lines: &[MenuLine<'_>], selected: usize, editing: bool) {
        self.ops
            .push(DisplayOp::Menu(title.to_owned(), selected, editing));
    }

    fn boot_line(&mut self, severity: Severity, text: &str) {
        self.ops.push(DisplayOp::BootLine(severity, text.to_owned()));
    }

    fn flash(&mut self, color: FlashColor, _ms: u16) {
        self.ops.push(DisplayOp::Flash(color));
    }

    fn set_brightness(&mut self, level: u8) {
        self.ops.push(DisplayOp::Brightness(level));
    }
}
