//! Fake real-time clock with a scriptable alarm register.

use chrono::NaiveDateTime;
use platform::{AlarmRegister, Rtc};

/// Error returned by every operation while `responding` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtcNotResponding;

/// Scriptable clock chip.
///
/// Tests drive `time`, `fired` and `lost_power` directly; the fake keeps
/// the same latched-flag semantics as the hardware (the fired flag stays
/// set until `clear_alarm_flag`).
pub struct FakeRtc {
    /// Current wall-clock time returned by `now`.
    pub time: NaiveDateTime,
    /// Programmed alarm register.
    pub alarm_reg: AlarmRegister,
    /// Alarm enable bit in the control register.
    pub enabled: bool,
    /// Latched alarm-fired flag.
    pub fired: bool,
    /// Power-loss flag reported at boot.
    pub lost_power: bool,
    /// When false, every operation fails (chip off the bus).
    pub responding: bool,
    /// Number of `set_alarm` register writes.
    pub set_alarm_writes: usize,
    /// Number of `clear_alarm_flag` calls.
    pub flag_clears: usize,
}

impl FakeRtc {
    /// A healthy chip at the given time, alarm 07:00 disabled.
    #[must_use]
    pub fn at(time: NaiveDateTime) -> Self {
        Self {
            time,
            alarm_reg: AlarmRegister { hour: 7, minute: 0 },
            enabled: false,
            fired: false,
            lost_power: false,
            responding: true,
            set_alarm_writes: 0,
            flag_clears: 0,
        }
    }

    /// Advance the fake clock.
    pub fn advance(&mut self, delta: chrono::Duration) {
        self.time += delta;
    }

    fn check(&self) -> Result<(), RtcNotResponding> {
        if self.responding {
            Ok(())
        } else {
            Err(RtcNotResponding)
        }
    }
}

impl Rtc for FakeRtc {
    type Error = RtcNotResponding;

    fn now(&mut self) -> Result<NaiveDateTime, Self::Error> {
        self.check()?;
        Ok(self.time)
    }

    fn set_time(&mut self, t: NaiveDateTime) -> Result<(), Self::Error> {
        self.check()?;
        self.time = t;
        self.lost_power = false;
        Ok(())
    }

    fn alarm(&mut self) -> Result<AlarmRegister, Self::Error> {
        self.check()?;
        Ok(self.alarm_reg)
    }

    fn set_alarm(&mut self, hour: u8, minute: u8) -> Result<(), Self::Error> {
        self.check()?;
        self.alarm_reg = AlarmRegister { hour, minute };
        self.enabled = true;
        self.set_alarm_writes += 1;
        Ok(())
    }

    fn alarm_enabled(&mut self) -> Result<bool, Self::Error> {
        self.check()?;
        Ok(self.enabled)
    }

    fn disable_alarm(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        self.enabled = false;
        Ok(())
    }

    fn alarm_fired(&mut self) -> Result<bool, Self::Error> {
        self.check()?;
        Ok(self.fired)
    }

    fn clear_alarm_flag(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        self.fired = false;
        self.flag_clears += 1;
        Ok(())
    }

    fn lost_power(&mut self) -> Result<bool, Self::Error> {
        self.check()?;
        Ok(self.lost_power)
    }
}
