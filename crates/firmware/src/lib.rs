//! Orchestration core for the Chime alarm clock.
//!
//! Wires the feature layers (alarm machine, network tasks, settings, shell,
//! ui) to the platform traits: one cooperative main loop plus the
//! background tasks for time sync, weather refresh, and the remote command
//! channel. Hardware drivers are out of tree; everything here runs against
//! the platform traits, so the whole firmware is testable on the host with
//! fakes.

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
#![allow(async_fn_in_trait)]

pub mod boot;
pub mod brightness;
pub mod core;
pub mod rfid;
pub mod shared;
pub mod tasks;

pub use self::core::{Board, ClockCore, ALARM_FOLDER, LOOP_DELAY};
pub use boot::BootReport;
pub use brightness::BrightnessController;
pub use rfid::{RfidPoller, RfidScan};
pub use shared::{RemoteLine, RemotePipe, ReplyLine, SharedSettings};
pub use tasks::{
    remote_burst, remote_task, time_sync_step, time_sync_task, weather_fetch, weather_step,
    weather_task,
};
