//! Front-panel interaction layer — button edge detection, app modes, and
//! the hierarchical settings menu.
//!
//! This crate is `no_std` by default; it only uses `core` + `heapless`.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

pub mod edge;
pub mod menu;
pub mod mode;

pub use edge::EdgeDetector;
pub use menu::{
    Item, ItemKind, MenuAction, MenuInput, MenuModel, MenuOutcome, PageId, SettingsMenu,
};
pub use mode::AppMode;
