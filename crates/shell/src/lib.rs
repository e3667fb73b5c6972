//! Text command interface, shared by the serial console and the remote
//! channel.
//!
//! Both transports deliver whole lines; [`dispatch`] runs them against a
//! fixed command table through the [`Host`] seam the firmware implements.
//! Replies are bounded and always carry the `[CLK]: ` prefix, which doubles
//! as the loopback guard on the remote transport.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(async_fn_in_trait)]

mod commands;
mod history;
mod line;
mod reply;

pub use commands::{dispatch, Host, COMMANDS};
pub use history::{History, HistoryLine, HISTORY_LINE_LEN};
pub use line::{LineBuffer, LineEvent, MAX_LINE_LEN};
pub use reply::{is_own_echo, Reply, REPLY_PREFIX};
