//! Scripted fake collaborators for host tests.
//!
//! Every `platform` trait has a fake here that records the calls made
//! against it and plays back scripted results, so the orchestration crates
//! can be exercised without hardware and without wall-clock time.
//!
//! This crate is host-only (std) and is consumed exclusively as a
//! dev-dependency.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod audio;
pub mod display;
pub mod input;
pub mod net;
pub mod rfid;
pub mod rtc;
pub mod store;

pub use audio::{AudioCall, FakeAudio};
pub use display::{DisplayOp, FakeDisplay};
pub use input::{FakeButtons, FakeLight, FakeSerial};
pub use net::{FakeLink, FakeRemote, LinkCall};
pub use rfid::FakeRfid;
pub use rtc::FakeRtc;
pub use store::MemStore;

/// Build a `NaiveDateTime` for test scripts; panics on invalid input,
/// which is fine in test code.
#[must_use]
#[allow(clippy::unwrap_used, clippy::panic)]
pub fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}
