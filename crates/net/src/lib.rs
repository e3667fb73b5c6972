//! Shared-radio arbitration and network-derived state.
//!
//! Three independent tasks (time sync, weather refresh, remote command
//! channel) share one Wi-Fi radio. [`WifiArbiter`] reference-counts their
//! sessions so none of them needs to know about the others;
//! [`WeatherStore`] holds the latest fetch result for the display; and
//! [`schedule`] computes the tasks' self-correcting wake-up times from the
//! shared clock.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod schedule;
mod weather;
mod wifi;

pub use weather::WeatherStore;
pub use wifi::{WifiArbiter, CONNECT_TIMEOUT};
