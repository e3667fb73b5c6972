//! RTC/alarm state machine.
//!
//! Single authority for "should the alarm be ringing". The hardware clock's
//! latched alarm register is the trigger source; this machine layers the
//! trigger/ringing/stop/escalation policy on top:
//!
//! - ringing goes `false → true` only when the hardware flag fires while the
//!   alarm is enabled and not already ringing (idempotent trigger), and
//!   `true → false` only through an explicit [`AlarmMachine::stop`];
//! - the hardware flag is cleared the moment it is observed (at-most-once);
//! - the hour:minute match is evaluated once per minute tick via a
//!   last-evaluated-minute sentinel, even though the main loop polls at
//!   sub-second cadence;
//! - one volume escalation per ringing episode after the snooze delay
//!   passes without dismissal.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]
#![warn(clippy::all)]

use chrono::{NaiveDateTime, Timelike};
use platform::{AlarmTime, AlarmTimeError, AudioPlayer, Rtc, MAX_VOLUME};

/// Why a [`AlarmMachine::set`] call was rejected.
#[derive(Debug, PartialEq, Eq)]
pub enum SetAlarmError<E> {
    /// Hour or minute out of range; nothing was mutated.
    Invalid(AlarmTimeError),
    /// The clock chip refused the register write; the in-memory alarm keeps
    /// its previous value.
    Rtc(E),
}

/// What to play when the alarm fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingTone {
    /// Track number of the alarm song.
    pub song: u8,
    /// Initial ringing volume (0-30).
    pub volume: u8,
    /// Minutes of undismissed ringing before the one-shot volume
    /// escalation.
    pub escalate_after_min: u8,
}

/// The alarm state machine. Owns no hardware; the clock and player handles
/// are passed into each operation.
pub struct AlarmMachine {
    alarm: AlarmTime,
    ringing: bool,
    escalated: bool,
    ring_started: Option<NaiveDateTime>,
    last_checked_minute: Option<u8>,
}

impl AlarmMachine {
    /// Machine with the given starting alarm, not ringing.
    #[must_use]
    pub fn new(alarm: AlarmTime) -> Self {
        Self {
            alarm,
            ringing: false,
            escalated: false,
            ring_started: None,
            last_checked_minute: None,
        }
    }

    /// Bring machine and hardware register into agreement at boot.
    ///
    /// Clears any stale fired flag. If the chip lost backup power its
    /// register contents are garbage: reprogram from the machine's alarm
    /// (clear-then-set; disabling needs the explicit disable as well,
    /// since a disabled-but-set register can still assert the fired flag).
    /// Otherwise the hardware register is adopted as the source of truth.
    ///
    /// Returns `false` when the chip does not respond; the machine then
    /// degrades to a safe disabled-alarm state instead of failing the boot.
    pub fn init<R: Rtc>(&mut self, rtc: &mut R) -> bool {
        self.ringing = false;
        self.escalated = false;
        self.ring_started = None;

        let outcome = (|| {
            rtc.clear_alarm_flag()?;
            if rtc.lost_power()? {
                log::warn!("rtc lost power, reprogramming alarm from defaults");
                rtc.set_alarm(self.alarm.hour(), self.alarm.minute())?;
                if !self.alarm.enabled() {
                    rtc.disable_alarm()?;
                }
            } else {
                let reg = rtc.alarm()?;
                let enabled = rtc.alarm_enabled()?;
                if let Ok(alarm) = AlarmTime::new(reg.hour, reg.minute, enabled) {
                    self.alarm = alarm;
                }
            }
            Ok::<(), R::Error>(())
        })();

        match outcome {
            Ok(()) => true,
            Err(err) => {
                log::error!("rtc not responding at boot: {err:?}");
                self.alarm = self.alarm.with_enabled(false);
                false
            }
        }
    }

    /// Poll the hardware fired flag and start ringing if it asserted.
    ///
    /// Evaluated once per minute tick; returns `true` at most once per
    /// trigger event. No-op while disabled or already ringing.
    pub fn check<R: Rtc, A: AudioPlayer>(
        &mut self,
        rtc: &mut R,
        audio: &mut A,
        now: NaiveDateTime,
        tone: RingTone,
    ) -> bool {
        let minute = now.minute() as u8;
        if self.last_checked_minute == Some(minute) {
            return false;
        }
        self.last_checked_minute = Some(minute);

        if !self.alarm.enabled() || self.ringing {
            return false;
        }

        match rtc.alarm_fired() {
            Ok(true) => {}
            Ok(false) => return false,
            Err(err) => {
                log::warn!("alarm flag read failed: {err:?}");
                return false;
            }
        }
        // Consume the latched flag immediately; the observation is
        // authoritative even if playback fails below.
        if let Err(err) = rtc.clear_alarm_flag() {
            log::warn!("alarm flag clear failed: {err:?}");
        }

        if let Err(err) = audio.set_volume(tone.volume.min(MAX_VOLUME)) {
            log::warn!("ring volume set failed: {err:?}");
        }
        if let Err(err) = audio.play_loop(tone.song) {
            log::warn!("ring playback failed: {err:?}");
        }

        self.ringing = true;
        self.escalated = false;
        self.ring_started = Some(now);
        log::info!("alarm ringing at {:02}:{:02}", now.hour(), now.minute());
        true
    }

    /// Escalate an undismissed ring to full volume, once per episode.
    pub fn maintain<A: AudioPlayer>(&mut self, audio: &mut A, now: NaiveDateTime, tone: RingTone) {
        if !self.ringing || self.escalated {
            return;
        }
        let Some(started) = self.ring_started else {
            return;
        };
        let elapsed = now.signed_duration_since(started);
        if elapsed >= chrono::Duration::minutes(i64::from(tone.escalate_after_min)) {
            log::info!("alarm undismissed for {}min, escalating", tone.escalate_after_min);
            if let Err(err) = audio.set_volume(MAX_VOLUME) {
                log::warn!("escalation volume set failed: {err:?}");
            }
            self.escalated = true;
        }
    }

    /// Stop a ringing alarm. Idempotent: a no-op when not ringing.
    /// Returns whether anything changed.
    pub fn stop<A: AudioPlayer>(&mut self, audio: &mut A) -> bool {
        if !self.ringing {
            return false;
        }
        if let Err(err) = audio.stop() {
            log::warn!("playback stop failed: {err:?}");
        }
        self.ringing = false;
        self.escalated = false;
        self.ring_started = None;
        log::info!("alarm stopped");
        true
    }

    /// Validate and apply a new alarm time, reprogramming the hardware
    /// register (clear-then-set, so a stale alarm cannot refire in the
    /// window). Disabling both clears and disables the register. The
    /// in-memory alarm is updated only after the hardware accepts it.
    pub fn set<R: Rtc>(
        &mut self,
        rtc: &mut R,
        hour: u8,
        minute: u8,
        enabled: bool,
    ) -> Result<AlarmTime, SetAlarmError<R::Error>> {
        let alarm = AlarmTime::new(hour, minute, enabled).map_err(SetAlarmError::Invalid)?;

        rtc.clear_alarm_flag().map_err(SetAlarmError::Rtc)?;
        if enabled {
            rtc.set_alarm(hour, minute).map_err(SetAlarmError::Rtc)?;
        } else {
            rtc.set_alarm(hour, minute).map_err(SetAlarmError::Rtc)?;
            rtc.disable_alarm().map_err(SetAlarmError::Rtc)?;
        }

        self.alarm = alarm;
        Ok(alarm)
    }

    /// Flip the enable flag, keeping the programmed time.
    pub fn toggle_enabled<R: Rtc>(&mut self, rtc: &mut R) -> Result<bool, SetAlarmError<R::Error>> {
        let next = !self.alarm.enabled();
        self.set(rtc, self.alarm.hour(), self.alarm.minute(), next)?;
        Ok(next)
    }

    /// The configured alarm.
    #[must_use]
    pub fn alarm(&self) -> AlarmTime {
        self.alarm
    }

    /// Whether the alarm is currently ringing.
    #[must_use]
    pub fn is_ringing(&self) -> bool {
        self.ringing
    }
}
