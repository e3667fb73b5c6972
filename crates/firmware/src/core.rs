//! The main clock loop and its command-interface host.

use alarm::{AlarmMachine, RingTone};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use embassy_time::{Duration, Timer};
use net::{WeatherStore, WifiArbiter};
use platform::{
    AlarmTime, AudioPlayer, Button, ButtonPad, Clockface, FlashColor, LightSensor, NetworkLink,
    RemoteChannel, RfidEvent, RfidReader, Rtc, SerialPort, SettingsStore, SharedRtc, UidString,
    WeatherData,
};
use settings::UserSettings;
use shell::{dispatch, Host, LineBuffer, LineEvent, Reply};
use ui::{AppMode, EdgeDetector, MenuAction, MenuInput, MenuOutcome, SettingsMenu};

use crate::brightness::BrightnessController;
use crate::rfid::RfidPoller;
use crate::shared::{RemotePipe, ReplyLine, SharedSettings};
use crate::tasks;

/// Minimum idle time per loop iteration. Keeps the watchdog fed and the
/// polling load bounded.
pub const LOOP_DELAY: Duration = Duration::from_millis(50);

/// Folder on the audio module holding the alarm songs.
pub const ALARM_FOLDER: u8 = 1;

const FLASH_MS: u16 = 300;

/// The peripherals the main loop owns exclusively.
pub struct Board<A, C, D, B, L, S, P> {
    /// Audio module.
    pub audio: A,
    /// Card reader.
    pub rfid: C,
    /// Display.
    pub display: D,
    /// Front-panel buttons.
    pub buttons: B,
    /// Ambient light sensor.
    pub light: L,
    /// Local serial console.
    pub serial: S,
    /// Persisted-settings namespace.
    pub store: P,
}

/// Orchestration core: owns the board, shares the clock and radio with
/// the background tasks, and advances everything one `tick` at a time.
pub struct ClockCore<'a, R: Rtc, N: NetworkLink, A, C, D, B, L, S, P> {
    pub(crate) rtc: &'a SharedRtc<R>,
    pub(crate) arbiter: &'a WifiArbiter<N>,
    pub(crate) weather: &'a WeatherStore,
    pub(crate) shared_settings: &'a SharedSettings,
    pub(crate) pipe: &'a RemotePipe,

    /// Audio module. Public so host tests can inspect the fake.
    pub audio: A,
    /// Card reader.
    pub rfid: C,
    /// Display.
    pub display: D,
    /// Front-panel buttons.
    pub buttons: B,
    /// Ambient light sensor.
    pub light: L,
    /// Local serial console.
    pub serial: S,
    /// Persisted-settings namespace.
    pub store: P,

    pub(crate) machine: AlarmMachine,
    pub(crate) settings: UserSettings,
    pub(crate) mode: AppMode,
    edge: EdgeDetector,
    menu: Option<SettingsMenu>,
    poller: RfidPoller,
    pub(crate) backlight: BrightnessController,
    line_buf: LineBuffer,

    last_second: Option<NaiveDateTime>,
    last_day: Option<NaiveDate>,
    last_alarm_drawn: Option<(AlarmTime, bool)>,
    last_weather_drawn: Option<WeatherData>,
}

impl<'a, R, N, A, C, D, B, L, S, P> ClockCore<'a, R, N, A, C, D, B, L, S, P>
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
    /// Assemble the core. Call [`ClockCore::boot`] before the first tick.
    pub fn new(
        board: Board<A, C, D, B, L, S, P>,
        rtc: &'a SharedRtc<R>,
        arbiter: &'a WifiArbiter<N>,
        weather: &'a WeatherStore,
        shared_settings: &'a SharedSettings,
        pipe: &'a RemotePipe,
        authorized_uid: UidString,
    ) -> Self {
        Self {
            rtc,
            arbiter,
            weather,
            shared_settings,
            pipe,
            audio: board.audio,
            rfid: board.rfid,
            display: board.display,
            buttons: board.buttons,
            light: board.light,
            serial: board.serial,
            store: board.store,
            machine: AlarmMachine::new(AlarmTime::DEFAULT),
            settings: UserSettings::default(),
            mode: AppMode::Boot,
            edge: EdgeDetector::new(),
            menu: None,
            poller: RfidPoller::new(authorized_uid),
            backlight: BrightnessController::new(0),
            line_buf: LineBuffer::new(),
            last_second: None,
            last_day: None,
            last_alarm_drawn: None,
            last_weather_drawn: None,
        }
    }

    /// The configured alarm (for status surfaces).
    #[must_use]
    pub fn alarm(&self) -> AlarmTime {
        self.machine.alarm()
    }

    /// Whether the alarm is ringing right now.
    #[must_use]
    pub fn is_ringing(&self) -> bool {
        self.machine.is_ringing()
    }

    /// Current app mode.
    #[must_use]
    pub fn mode(&self) -> AppMode {
        self.mode
    }

    fn tone(&self) -> RingTone {
        RingTone {
            song: self.settings.alarm_song,
            volume: self.settings.volume,
            escalate_after_min: self.settings.snooze_minutes,
        }
    }

    pub(crate) fn invalidate(&mut self) {
        self.last_second = None;
        self.last_day = None;
        self.last_alarm_drawn = None;
        self.last_weather_drawn = None;
    }

    /// One main-loop iteration: console, remote queue, card reader,
    /// buttons, alarm, redraws, backlight.
    pub async fn tick(&mut self) {
        self.service_serial().await;
        self.service_remote().await;

        let now = match self.rtc.now() {
            Ok(t) => Some(t),
            Err(err) => {
                log::warn!("clock read failed: {err:?}");
                None
            }
        };

        self.service_rfid(now);
        self.service_buttons().await;

        if let Some(now) = now {
            self.service_alarm(now);
            if self.mode == AppMode::Clock {
                self.redraw_clock(now);
            }
        }
        self.service_backlight();
    }

    /// Run the loop forever alongside the background tasks.
    pub async fn run<M: RemoteChannel>(mut self, remote: M) {
        let arbiter = self.arbiter;
        let rtc = self.rtc;
        let weather = self.weather;
        let shared = self.shared_settings;
        let pipe = self.pipe;

        let main_loop = async move {
            loop {
                self.tick().await;
                Timer::after(LOOP_DELAY).await;
            }
        };

        embassy_futures::join::join4(
            main_loop,
            tasks::time_sync_task(arbiter, rtc),
            tasks::weather_task(arbiter, weather, shared, rtc),
            tasks::remote_task(remote, arbiter, rtc, shared, pipe),
        )
        .await;
    }

    async fn service_serial(&mut self) {
        while let Some(byte) = self.serial.read_byte() {
            match self.line_buf.push(byte) {
                Some(LineEvent::Line(line)) => {
                    if let Some(reply) = self.handle_line(&line).await {
                        self.serial.write_line(reply.as_str());
                    }
                }
                Some(LineEvent::Overflow) => {
                    let mut reply = Reply::new();
                    reply.push_str("input line too long, discarded.");
                    self.serial.write_line(reply.as_str());
                }
                None => {}
            }
        }
    }

    async fn service_remote(&mut self) {
        while let Some(line) = self.pipe.take_command() {
            if let Some(reply) = self.handle_line(&line).await {
                if let Ok(out) = ReplyLine::try_from(reply.as_str()) {
                    self.pipe.push_reply(out);
                }
            }
        }
    }

    async fn handle_line(&mut self, line: &str) -> Option<Reply> {
        let mut host = CoreHost {
            rtc: self.rtc,
            arbiter: self.arbiter,
            weather: self.weather,
            shared: self.shared_settings,
            audio: &mut self.audio,
            machine: &mut self.machine,
            settings: &mut self.settings,
            store: &mut self.store,
        };
        let reply = dispatch(line, &mut host).await;
        if reply.is_some() {
            // The command may have moved the alarm or the volume; let the
            // next redraw pick the status up.
            self.last_alarm_drawn = None;
        }
        reply
    }

    fn service_rfid(&mut self, now: Option<NaiveDateTime>) {
        let scan = self.poller.poll(&mut self.rfid);
        match scan.event {
            RfidEvent::None => return,
            RfidEvent::AlarmCard => {
                if self.machine.is_ringing() {
                    self.machine.stop(&mut self.audio);
                    self.display.flash(FlashColor::Red, FLASH_MS);
                } else {
                    match self.rtc.with(|r| self.machine.toggle_enabled(r)) {
                        Ok(on) => {
                            log::info!("alarm card: alarm {}", if on { "enabled" } else { "disabled" });
                        }
                        Err(err) => log::warn!("alarm toggle failed: {err:?}"),
                    }
                    self.display.flash(FlashColor::Green, FLASH_MS);
                }
            }
            RfidEvent::UnknownCard => {
                if let Some(uid) = &scan.uid {
                    log::info!("unknown card {uid}");
                }
                self.display.flash(FlashColor::Yellow, FLASH_MS);
            }
        }
        // The flash replaced the screen; restore it within this same
        // iteration.
        match self.mode {
            AppMode::Settings => self.draw_menu(),
            _ => {
                self.display.clear();
                self.invalidate();
                if let Some(now) = now {
                    self.redraw_clock(now);
                }
            }
        }
    }

    async fn service_buttons(&mut self) {
        let sample = self.buttons.sample();
        let Some(button) = self.edge.update(sample) else {
            return;
        };
        match self.mode {
            AppMode::Boot => {}
            AppMode::Clock => match button {
                Button::One => self.open_menu(),
                Button::Two => {
                    match self.rtc.with(|r| self.machine.toggle_enabled(r)) {
                        Ok(on) => log::info!("alarm {}", if on { "enabled" } else { "disabled" }),
                        Err(err) => log::warn!("alarm toggle failed: {err:?}"),
                    }
                    self.last_alarm_drawn = None;
                }
                Button::Three => {
                    if self.settings.weather_enabled {
                        let _ =
                            tasks::weather_fetch(self.arbiter, self.weather, self.settings.units)
                                .await;
                    }
                }
                Button::Four => {}
            },
            AppMode::Settings => {
                let input = match button {
                    Button::One => MenuInput::Back,
                    Button::Two => MenuInput::Up,
                    Button::Three => MenuInput::Down,
                    Button::Four => MenuInput::Select,
                };
                self.menu_input(input).await;
            }
        }
    }

    fn open_menu(&mut self) {
        self.menu = Some(SettingsMenu::new(
            self.settings.clone(),
            self.machine.alarm(),
        ));
        self.mode = AppMode::Settings;
        self.draw_menu();
    }

    fn draw_menu(&mut self) {
        let Some(menu) = &self.menu else {
            return;
        };
        let mut lines = heapless::Vec::new();
        menu.render(&mut lines);
        self.display
            .draw_menu(menu.title(), &lines, menu.selected(), menu.is_editing());
    }

    async fn menu_input(&mut self, input: MenuInput) {
        let Some(menu) = &mut self.menu else {
            return;
        };
        let outcome = menu.handle(input);
        let model_settings = menu.model.settings.clone();
        let model_alarm = menu.model.alarm;

        match outcome {
            MenuOutcome::None => self.draw_menu(),
            MenuOutcome::AlarmChanged => {
                let result = self.rtc.with(|r| {
                    self.machine.set(
                        r,
                        model_alarm.hour(),
                        model_alarm.minute(),
                        model_alarm.enabled(),
                    )
                });
                if let Err(err) = result {
                    log::warn!("alarm reprogram from menu failed: {err:?}");
                }
                self.draw_menu();
            }
            MenuOutcome::Action(MenuAction::SyncTime) => {
                let _ = tasks::time_sync_step(self.arbiter, self.rtc).await;
                self.draw_menu();
            }
            MenuOutcome::Action(MenuAction::TestAlarm) => {
                let song = model_settings.alarm_song;
                let volume = model_settings.volume;
                if let Err(err) = self.audio.play(ALARM_FOLDER, song, volume) {
                    log::warn!("alarm test playback failed: {err:?}");
                }
                self.draw_menu();
            }
            MenuOutcome::Exit { save } => {
                self.settings = model_settings;
                self.shared_settings.publish(self.settings.clone());
                if let Err(err) = self.audio.set_volume(self.settings.volume) {
                    log::warn!("volume apply failed: {err:?}");
                }
                if save {
                    if let Err(err) = settings::save(&self.settings, &mut self.store) {
                        log::warn!("settings save failed: {err:?}");
                    }
                }
                self.menu = None;
                self.mode = AppMode::Clock;
                self.display.clear();
                self.invalidate();
            }
        }
    }

    fn service_alarm(&mut self, now: NaiveDateTime) {
        let tone = self.tone();
        let fired = self
            .rtc
            .with(|r| self.machine.check(r, &mut self.audio, now, tone));
        if fired {
            self.last_alarm_drawn = None;
        }
        self.machine.maintain(&mut self.audio, now, tone);
    }

    fn redraw_clock(&mut self, now: NaiveDateTime) {
        let tick = now.with_nanosecond(0).unwrap_or(now);
        if self.last_second != Some(tick) {
            self.display.draw_time(now, self.settings.use_24h);
            self.last_second = Some(tick);
        }
        if self.last_day != Some(now.date()) {
            self.display.draw_date(now);
            self.last_day = Some(now.date());
        }
        let status = (self.machine.alarm(), self.machine.is_ringing());
        if self.last_alarm_drawn != Some(status) {
            self.display.draw_alarm_status(&status.0, status.1);
            self.last_alarm_drawn = Some(status);
        }
        let weather = self.weather.get();
        if self.last_weather_drawn.as_ref() != Some(&weather) {
            self.display.draw_weather(&weather, self.settings.units);
            self.last_weather_drawn = Some(weather);
        }
    }

    fn service_backlight(&mut self) {
        let raw = self.light.read();
        if let Some(level) = self.backlight.update(self.settings.brightness, raw) {
            self.display.set_brightness(level);
        }
    }
}

/// The firmware side of the shell seam: borrows exactly the parts of the
/// core a command may touch.
struct CoreHost<'h, R: Rtc, N: NetworkLink, A, P> {
    rtc: &'h SharedRtc<R>,
    arbiter: &'h WifiArbiter<N>,
    weather: &'h WeatherStore,
    shared: &'h SharedSettings,
    audio: &'h mut A,
    machine: &'h mut AlarmMachine,
    settings: &'h mut UserSettings,
    store: &'h mut P,
}

impl<R: Rtc, N: NetworkLink, A: AudioPlayer, P: SettingsStore> CoreHost<'_, R, N, A, P> {
    fn persist(&mut self) {
        self.shared.publish(self.settings.clone());
        if let Err(err) = settings::save(self.settings, self.store) {
            log::warn!("settings save failed: {err:?}");
        }
    }
}

impl<R: Rtc, N: NetworkLink, A: AudioPlayer, P: SettingsStore> Host for CoreHost<'_, R, N, A, P> {
    fn status(&mut self, out: &mut Reply) {
        use core::fmt::Write;
        match self.rtc.now() {
            Ok(now) => {
                let _ = write!(
                    out,
                    "time {:02}:{:02}:{:02}",
                    now.hour(),
                    now.minute(),
                    now.second()
                );
            }
            Err(_) => out.push_str("time unavailable"),
        }
        let alarm = self.machine.alarm();
        let _ = write!(
            out,
            " | alarm {:02}:{:02} {}",
            alarm.hour(),
            alarm.minute(),
            if alarm.enabled() { "on" } else { "off" }
        );
        if self.machine.is_ringing() {
            out.push_str(" (ringing)");
        }
        match self.arbiter.try_status() {
            Some((sessions, persistent, connected)) => {
                let _ = write!(
                    out,
                    " | wifi {} ({sessions} sessions{})",
                    if connected { "up" } else { "down" },
                    if persistent { ", persistent" } else { "" }
                );
            }
            None => out.push_str(" | wifi busy"),
        }
        let weather = self.weather.get();
        if weather.valid {
            let unit = match self.settings.units {
                platform::Units::Celsius => "C",
                platform::Units::Fahrenheit => "F",
            };
            let _ = write!(out, " | {:.1}{unit} {}", weather.temperature, weather.description);
        }
    }

    fn set_alarm(&mut self, hour: u8, minute: u8) -> bool {
        self.rtc
            .with(|r| self.machine.set(r, hour, minute, true))
            .is_ok()
    }

    fn disable_alarm(&mut self) -> bool {
        let alarm = self.machine.alarm();
        self.rtc
            .with(|r| self.machine.set(r, alarm.hour(), alarm.minute(), false))
            .is_ok()
    }

    fn set_volume(&mut self, volume: u8) -> bool {
        if self.audio.set_volume(volume).is_err() {
            return false;
        }
        self.settings.volume = volume;
        self.persist();
        true
    }

    fn play(&mut self, folder: u8, track: u8, volume: Option<u8>) -> bool {
        let volume = volume.unwrap_or(self.settings.volume);
        self.audio.play(folder, track, volume).is_ok()
    }

    fn stop_playback(&mut self) {
        if !self.machine.stop(self.audio) {
            if let Err(err) = self.audio.stop() {
                log::warn!("playback stop failed: {err:?}");
            }
        }
    }

    async fn sync_time(&mut self) -> bool {
        tasks::time_sync_step(self.arbiter, self.rtc).await
    }

    async fn sync_weather(&mut self) -> bool {
        if !self.settings.weather_enabled {
            return false;
        }
        tasks::weather_fetch(self.arbiter, self.weather, self.settings.units).await
    }

    async fn set_wifi_persistent(&mut self, on: bool) -> bool {
        self.arbiter.set_persistent(on).await;
        self.settings.wifi_persistent = on;
        self.persist();
        true
    }
}
