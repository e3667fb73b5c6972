//! Real-time clock abstraction.
//!
//! The clock chip (DS3231-class) is the sole source of wall-clock time and
//! of alarm-fired detection. The hardware alarm register is a latched
//! hour:minute match; the fired flag stays asserted until explicitly
//! cleared, so observing it and clearing it must happen together.

use core::cell::RefCell;

use chrono::NaiveDateTime;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use thiserror_no_std::Error;

/// Hour:minute pair as read back from the hardware alarm register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmRegister {
    /// Alarm hour (0-23).
    pub hour: u8,
    /// Alarm minute (0-59).
    pub minute: u8,
}

/// Real-time clock collaborator.
///
/// Every operation is fallible: the chip sits on a shared bus and may stop
/// responding. Callers inspect each result immediately and degrade rather
/// than abort.
pub trait Rtc {
    /// Error type.
    type Error: core::fmt::Debug;

    /// Current wall-clock time.
    fn now(&mut self) -> Result<NaiveDateTime, Self::Error>;

    /// Write a new wall-clock time (NTP sync result).
    fn set_time(&mut self, t: NaiveDateTime) -> Result<(), Self::Error>;

    /// Read back the programmed alarm register.
    fn alarm(&mut self) -> Result<AlarmRegister, Self::Error>;

    /// Program the alarm register for a daily hour:minute match and enable it.
    fn set_alarm(&mut self, hour: u8, minute: u8) -> Result<(), Self::Error>;

    /// Whether the alarm is enabled in the chip's control register.
    fn alarm_enabled(&mut self) -> Result<bool, Self::Error>;

    /// Disable the alarm. The register keeps its value; a disabled-but-set
    /// alarm can still assert its fired flag on some chips, so callers clear
    /// the flag as well.
    fn disable_alarm(&mut self) -> Result<(), Self::Error>;

    /// Whether the latched alarm-fired flag is asserted.
    fn alarm_fired(&mut self) -> Result<bool, Self::Error>;

    /// Clear the latched alarm-fired flag.
    fn clear_alarm_flag(&mut self) -> Result<(), Self::Error>;

    /// Whether the chip lost backup power since the last check (time and
    /// alarm register contents are untrustworthy).
    fn lost_power(&mut self) -> Result<bool, Self::Error>;
}

/// The single clock chip shared between the main loop and the time-sync task.
///
/// Individual register operations are short and blocking; the critical
/// section serializes them. Nothing holds the lock across an await point.
pub struct SharedRtc<R>(Mutex<CriticalSectionRawMutex, RefCell<R>>);

impl<R: Rtc> SharedRtc<R> {
    /// Wrap a clock handle for cross-task sharing.
    pub fn new(rtc: R) -> Self {
        Self(Mutex::new(RefCell::new(rtc)))
    }

    /// Run `f` with exclusive access to the clock.
    pub fn with<T>(&self, f: impl FnOnce(&mut R) -> T) -> T {
        self.0.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Current wall-clock time.
    pub fn now(&self) -> Result<NaiveDateTime, R::Error> {
        self.with(Rtc::now)
    }

    /// Write a new wall-clock time.
    pub fn set_time(&self, t: NaiveDateTime) -> Result<(), R::Error> {
        self.with(|rtc| rtc.set_time(t))
    }
}

/// Rejected alarm time component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmTimeError {
    /// Hour outside 0-23.
    #[error("hour out of range")]
    Hour,
    /// Minute outside 0-59.
    #[error("minute out of range")]
    Minute,
}

/// One daily recurring alarm.
///
/// Fields are private so a value can only be built through the validating
/// constructor; an `AlarmTime` in hand is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmTime {
    hour: u8,
    minute: u8,
    enabled: bool,
}

impl AlarmTime {
    /// Factory default: 07:00, disabled.
    pub const DEFAULT: Self = Self {
        hour: 7,
        minute: 0,
        enabled: false,
    };

    /// Build an alarm time, rejecting out-of-range components.
    pub fn new(hour: u8, minute: u8, enabled: bool) -> Result<Self, AlarmTimeError> {
        if hour > 23 {
            return Err(AlarmTimeError::Hour);
        }
        if minute > 59 {
            return Err(AlarmTimeError::Minute);
        }
        Ok(Self {
            hour,
            minute,
            enabled,
        })
    }

    /// Alarm hour (0-23).
    #[must_use]
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Alarm minute (0-59).
    #[must_use]
    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Whether the alarm is armed.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Return the same time with a different enable flag.
    #[must_use]
    pub fn with_enabled(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }

    /// Step the time by `delta` five-minute increments, carrying between
    /// minute and hour (settings-menu editing).
    #[must_use]
    pub fn stepped(self, delta: i8) -> Self {
        let total = i32::from(self.hour) * 60 + i32::from(self.minute) + i32::from(delta) * 5;
        let total = total.rem_euclid(24 * 60);
        Self {
            hour: (total / 60) as u8,
            minute: (total % 60) as u8,
            enabled: self.enabled,
        }
    }
}

impl Default for AlarmTime {
    fn default() -> Self {
        Self::DEFAULT
    }
}
