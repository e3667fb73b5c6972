//! Hardware abstraction layer for the Chime alarm clock.
//!
//! This crate provides trait-based abstractions for every hardware
//! collaborator the orchestration core talks to, enabling development and
//! testing without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Orchestration (firmware crate)
//!         ↓
//! Feature Layers (alarm, net, shell, ui, settings)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Drivers (out of tree - RTC chip, audio module, RFID, radio)
//! ```
//!
//! # Collaborators
//!
//! - [`Rtc`] - real-time clock with a hardware alarm register
//! - [`AudioPlayer`] - serial audio module (track playback, volume)
//! - [`RfidReader`] - card presence and UID reads
//! - [`NetworkLink`] / [`RemoteChannel`] - Wi-Fi radio and remote command pipe
//! - [`Clockface`] - region-disjoint display surface
//! - [`ButtonPad`] / [`LightSensor`] - front-panel input and ambient light
//! - [`SerialPort`] - local command-line transport
//! - [`SettingsStore`] - opaque persisted-settings blob
//!
//! # Features
//!
//! - `std`: standard library support (for testing)
//! - `defmt`: defmt::Format derives on platform types

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // single-threaded embedded executor, no Send bounds

pub mod audio;
pub mod display;
pub mod input;
pub mod light;
pub mod net;
pub mod rfid;
pub mod rtc;
pub mod serial;
pub mod store;

pub use audio::{AudioPlayer, MAX_VOLUME};
pub use display::{Clockface, FlashColor, MenuLine, Severity};
pub use input::{Button, ButtonPad, ButtonSample};
pub use light::LightSensor;
pub use net::{NetworkLink, RemoteChannel, Units, WeatherData};
pub use rfid::{format_uid, RfidEvent, RfidReader, Uid, UidString, MAX_UID_LEN};
pub use rtc::{AlarmRegister, AlarmTime, AlarmTimeError, Rtc, SharedRtc};
pub use serial::SerialPort;
pub use store::SettingsStore;
