//! Boot sequence: bring every collaborator up, degrade where one refuses,
//! and hand the core over to the main loop in clock mode.

use platform::{
    AudioPlayer, ButtonPad, Clockface, LightSensor, NetworkLink, RfidReader, Rtc, SerialPort,
    Severity, SettingsStore,
};
use settings::LoadOutcome;
use ui::AppMode;

use crate::core::ClockCore;
use crate::tasks;

/// What came up and what did not. A clock with a dead radio or a mute
/// speaker still boots; the report is for the banner and the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootReport {
    /// Clock chip responded and the alarm register was reconciled.
    pub rtc_ok: bool,
    /// Audio module accepted the boot volume.
    pub audio_ok: bool,
    /// Card reader passed its self test.
    pub rfid_ok: bool,
    /// Initial network time sync succeeded.
    pub time_synced: bool,
    /// Initial weather fetch succeeded (or was disabled).
    pub weather_ok: bool,
}

impl<R, N, A, C, D, B, L, S, P> ClockCore<'_, R, N, A, C, D, B, L, S, P>
where
    R: Rtc,
    N: NetworkLink,
    A: AudioPlayer,
    C: RfidReader,
    D: Clockface,
    B: ButtonPad,
    L: LightSensor,
    S: SerialPort,
    P: SettingsStore,
{
    /// Run the boot sequence. Every step that fails logs, lands a warning
    /// line on the banner, and lets the rest continue.
    pub async fn boot(&mut self) -> BootReport {
        self.display.boot_line(Severity::Info, "chime starting");

        let (settings, outcome) = settings::load(&mut self.store);
        self.settings = settings;
        self.shared_settings.publish(self.settings.clone());
        match outcome {
            LoadOutcome::Loaded => self.display.boot_line(Severity::Info, "settings loaded"),
            LoadOutcome::Reset(reason) => {
                log::warn!("settings reset: {reason:?}");
                self.display.boot_line(Severity::Warn, "settings reset to defaults");
            }
        }

        let rtc_ok = self.rtc.with(|r| self.machine.init(r));
        self.display.boot_line(
            if rtc_ok { Severity::Info } else { Severity::Error },
            if rtc_ok { "clock ok" } else { "clock not responding" },
        );

        let audio_ok = self.audio.set_volume(self.settings.volume).is_ok();
        if !audio_ok {
            log::warn!("audio module not responding");
        }
        self.display.boot_line(
            if audio_ok { Severity::Info } else { Severity::Warn },
            if audio_ok { "audio ok" } else { "audio not responding" },
        );

        let rfid_ok = self.rfid.online();
        self.display.boot_line(
            if rfid_ok { Severity::Info } else { Severity::Warn },
            if rfid_ok { "card reader ok" } else { "card reader not responding" },
        );

        self.arbiter.set_persistent(self.settings.wifi_persistent).await;

        let time_synced = tasks::time_sync_step(self.arbiter, self.rtc).await;
        self.display.boot_line(
            if time_synced { Severity::Info } else { Severity::Warn },
            if time_synced { "time synced" } else { "time sync failed, clock time kept" },
        );

        let weather_ok = if self.settings.weather_enabled {
            let ok = tasks::weather_fetch(self.arbiter, self.weather, self.settings.units).await;
            self.display.boot_line(
                if ok { Severity::Info } else { Severity::Warn },
                if ok { "weather ok" } else { "weather fetch failed" },
            );
            ok
        } else {
            true
        };

        self.mode = AppMode::Clock;
        self.display.clear();
        self.invalidate();

        BootReport {
            rtc_ok,
            audio_ok,
            rfid_ok,
            time_synced,
            weather_ok,
        }
    }
}
