//! End-to-end scenarios through the orchestration core: boot, ringing,
//! card dismissal, and front-panel input, all against the fakes.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use fakes::{
    dt, AudioCall, DisplayOp, FakeAudio, FakeButtons, FakeDisplay, FakeLight, FakeLink, FakeRfid,
    FakeRtc, FakeSerial, MemStore,
};
use firmware::{Board, ClockCore, RemotePipe, SharedSettings};
use net::{WeatherStore, WifiArbiter};
use platform::{format_uid, Button, FlashColor, SharedRtc, Units};
use settings::UserSettings;

const AUTH_UID: [u8; 4] = [0x04, 0xA1, 0xB2, 0xC3];

type FakeBoard = Board<FakeAudio, FakeRfid, FakeDisplay, FakeButtons, FakeLight, FakeSerial, MemStore>;

fn board() -> FakeBoard {
    Board {
        audio: FakeAudio::new(),
        rfid: FakeRfid::new(),
        display: FakeDisplay::new(),
        buttons: FakeButtons::new(),
        light: FakeLight::new(1500),
        serial: FakeSerial::new(),
        store: MemStore::new(),
    }
}

fn authorized() -> platform::UidString {
    format_uid(&AUTH_UID)
}

#[tokio::test]
async fn test_first_boot_resaves_defaults_and_reports() {
    let rtc = SharedRtc::new(FakeRtc::at(dt(2025, 3, 2, 6, 0, 0)));
    let arbiter = WifiArbiter::new(FakeLink::new());
    let weather = WeatherStore::new();
    let shared = SharedSettings::new(UserSettings::default());
    let pipe = RemotePipe::new();
    let mut core = ClockCore::new(board(), &rtc, &arbiter, &weather, &shared, &pipe, authorized());

    let report = core.boot().await;
    assert!(report.rtc_ok);
    assert!(report.audio_ok);
    assert!(report.rfid_ok);
    // Empty scripts: the network calls fail, the clock boots anyway.
    assert!(!report.time_synced);
    assert!(!report.weather_ok);

    // Empty store: defaults were adopted and written back.
    assert_eq!(core.store.saves, 1);
    assert!(core.store.blob.is_some());
    // Boot volume applied from defaults.
    assert_eq!(core.audio.last(), Some(AudioCall::SetVolume(20)));
    // Radio balanced despite the failures.
    assert_eq!(arbiter.session_count().await, 0);
    assert!(!arbiter.is_connected().await);
}

#[tokio::test]
async fn test_boot_after_power_loss_reprograms_alarm_register() {
    let mut chip = FakeRtc::at(dt(2025, 3, 2, 6, 0, 0));
    chip.lost_power = true;
    let rtc = SharedRtc::new(chip);
    let arbiter = WifiArbiter::new(FakeLink::new());
    let weather = WeatherStore::new();
    let shared = SharedSettings::new(UserSettings::default());
    let pipe = RemotePipe::new();
    let mut core = ClockCore::new(board(), &rtc, &arbiter, &weather, &shared, &pipe, authorized());

    let report = core.boot().await;
    assert!(report.rtc_ok);
    // Register rewritten from the default alarm, disabled.
    rtc.with(|r| {
        assert_eq!(r.set_alarm_writes, 1);
        assert_eq!((r.alarm_reg.hour, r.alarm_reg.minute), (7, 0));
        assert!(!r.enabled);
    });
    assert!(!core.alarm().enabled());
}

#[tokio::test]
async fn test_boot_degrades_when_chips_missing() {
    let mut chip = FakeRtc::at(dt(2025, 3, 2, 6, 0, 0));
    chip.responding = false;
    let rtc = SharedRtc::new(chip);
    let arbiter = WifiArbiter::new(FakeLink::new());
    let weather = WeatherStore::new();
    let shared = SharedSettings::new(UserSettings::default());
    let pipe = RemotePipe::new();
    let mut b = board();
    b.rfid.responding = false;
    let mut core = ClockCore::new(b, &rtc, &arbiter, &weather, &shared, &pipe, authorized());

    let report = core.boot().await;
    assert!(!report.rtc_ok);
    assert!(!report.rfid_ok);
    assert!(report.audio_ok);
    // Still reaches clock mode; a dead clock read just skips the redraw.
    core.tick().await;
    assert!(!core.is_ringing());
}

#[tokio::test]
async fn test_alarm_rings_and_card_dismisses() {
    let mut chip = FakeRtc::at(dt(2025, 3, 2, 6, 59, 50));
    chip.enabled = true;
    let rtc = SharedRtc::new(chip);
    let arbiter = WifiArbiter::new(FakeLink::new());
    let weather = WeatherStore::new();
    let shared = SharedSettings::new(UserSettings::default());
    let pipe = RemotePipe::new();
    let mut core = ClockCore::new(board(), &rtc, &arbiter, &weather, &shared, &pipe, authorized());
    core.boot().await;
    assert!(core.alarm().enabled(), "boot adopts the hardware register");

    // The hardware flag latches at 07:00.
    rtc.with(|r| {
        r.time = dt(2025, 3, 2, 7, 0, 0);
        r.fired = true;
    });
    core.tick().await;
    assert!(core.is_ringing());
    assert_eq!(core.audio.last(), Some(AudioCall::Loop(1)), "default song loops");
    rtc.with(|r| assert!(!r.fired, "latched flag consumed on observation"));

    // Authorized card while ringing: dismiss, red flash, face restored.
    core.rfid.present_card(&AUTH_UID);
    rtc.with(|r| r.time = dt(2025, 3, 2, 7, 0, 1));
    core.tick().await;
    assert!(!core.is_ringing());
    assert_eq!(core.audio.last(), Some(AudioCall::Stop));
    let flash_at = core
        .display
        .ops
        .iter()
        .position(|op| *op == DisplayOp::Flash(FlashColor::Red))
        .expect("red flash drawn");
    assert!(
        core.display.ops[flash_at..]
            .iter()
            .any(|op| matches!(op, DisplayOp::Time(_, _))),
        "clock face restored in the same iteration"
    );
}

#[tokio::test]
async fn test_card_while_idle_toggles_alarm() {
    let mut chip = FakeRtc::at(dt(2025, 3, 2, 12, 0, 0));
    chip.enabled = true;
    let rtc = SharedRtc::new(chip);
    let arbiter = WifiArbiter::new(FakeLink::new());
    let weather = WeatherStore::new();
    let shared = SharedSettings::new(UserSettings::default());
    let pipe = RemotePipe::new();
    let mut core = ClockCore::new(board(), &rtc, &arbiter, &weather, &shared, &pipe, authorized());
    core.boot().await;

    core.rfid.present_card(&AUTH_UID);
    core.tick().await;
    assert!(!core.alarm().enabled());
    rtc.with(|r| assert!(!r.enabled));
    assert_eq!(core.display.count(|op| *op == DisplayOp::Flash(FlashColor::Green)), 1);

    // Second tap re-arms.
    core.rfid.present_card(&AUTH_UID);
    core.tick().await;
    assert!(core.alarm().enabled());
}

#[tokio::test]
async fn test_unknown_card_flashes_yellow_only() {
    let mut chip = FakeRtc::at(dt(2025, 3, 2, 12, 0, 0));
    chip.enabled = true;
    let rtc = SharedRtc::new(chip);
    let arbiter = WifiArbiter::new(FakeLink::new());
    let weather = WeatherStore::new();
    let shared = SharedSettings::new(UserSettings::default());
    let pipe = RemotePipe::new();
    let mut core = ClockCore::new(board(), &rtc, &arbiter, &weather, &shared, &pipe, authorized());
    core.boot().await;

    core.rfid.present_card(&[0xDE, 0xAD, 0xBE, 0xEF]);
    core.tick().await;
    assert!(core.alarm().enabled(), "stranger's card changes nothing");
    assert_eq!(core.display.count(|op| *op == DisplayOp::Flash(FlashColor::Yellow)), 1);
}

#[tokio::test]
async fn test_button_two_toggles_alarm_from_clock_mode() {
    let mut chip = FakeRtc::at(dt(2025, 3, 2, 12, 0, 0));
    chip.enabled = true;
    let rtc = SharedRtc::new(chip);
    let arbiter = WifiArbiter::new(FakeLink::new());
    let weather = WeatherStore::new();
    let shared = SharedSettings::new(UserSettings::default());
    let pipe = RemotePipe::new();
    let mut core = ClockCore::new(board(), &rtc, &arbiter, &weather, &shared, &pipe, authorized());
    core.boot().await;

    core.buttons.press(Button::Two);
    core.tick().await;
    assert!(!core.alarm().enabled());

    // Held button: the queue ran dry so the pad reads idle, then a second
    // press toggles again.
    core.tick().await;
    core.buttons.press(Button::Two);
    core.tick().await;
    assert!(core.alarm().enabled());
}

#[tokio::test]
async fn test_menu_open_edit_and_save_on_exit() {
    let rtc = SharedRtc::new(FakeRtc::at(dt(2025, 3, 2, 12, 0, 0)));
    let arbiter = WifiArbiter::new(FakeLink::new());
    let weather = WeatherStore::new();
    let shared = SharedSettings::new(UserSettings::default());
    let pipe = RemotePipe::new();
    let mut core = ClockCore::new(board(), &rtc, &arbiter, &weather, &shared, &pipe, authorized());
    core.boot().await;
    core.tick().await;
    let saves_after_boot = core.store.saves;

    // Button one opens the menu.
    core.buttons.press(Button::One);
    core.tick().await;
    assert_eq!(
        core.display.last(),
        Some(&DisplayOp::Menu("settings".to_owned(), 0, false))
    );

    // Down twice to "weather", select toggles it off.
    for button in [Button::Three, Button::Three, Button::Four] {
        core.buttons.release();
        core.buttons.press(button);
        core.tick().await;
        core.tick().await;
    }

    // Back at the root closes the menu and persists.
    core.buttons.release();
    core.buttons.press(Button::One);
    core.tick().await;
    core.tick().await;
    assert_eq!(core.store.saves, saves_after_boot + 1);
    assert!(!shared.with(|s| s.weather_enabled), "edit published to the tasks");
}

#[tokio::test]
async fn test_weather_redraws_only_on_change() {
    let mut link = FakeLink::new();
    let mut data = platform::WeatherData::invalid();
    data.temperature = 21.5;
    data.valid = true;
    link.weather_script.push_back(Ok(data));
    let rtc = SharedRtc::new(FakeRtc::at(dt(2025, 3, 2, 12, 0, 0)));
    let arbiter = WifiArbiter::new(link);
    let weather = WeatherStore::new();
    let shared = SharedSettings::new(UserSettings::default());
    let pipe = RemotePipe::new();
    let mut core = ClockCore::new(board(), &rtc, &arbiter, &weather, &shared, &pipe, authorized());
    core.boot().await;
    core.tick().await;
    let drawn = core.display.count(|op| matches!(op, DisplayOp::Weather(_)));
    assert_eq!(drawn, 1, "boot fetch drawn on the first tick");

    // Same published value: further ticks add no weather draws.
    core.tick().await;
    core.tick().await;
    assert_eq!(core.display.count(|op| matches!(op, DisplayOp::Weather(_))), drawn);

    // A fresh fetch with a different reading triggers one redraw.
    let mut next = platform::WeatherData::invalid();
    next.temperature = 23.0;
    next.valid = true;
    arbiter.link().await.weather_script.push_back(Ok(next));
    assert!(firmware::weather_fetch(&arbiter, &weather, Units::Celsius).await);
    core.tick().await;
    assert_eq!(
        core.display.count(|op| matches!(op, DisplayOp::Weather(_))),
        drawn + 1
    );
}
