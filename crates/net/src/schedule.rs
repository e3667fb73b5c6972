//! Wake-up arithmetic for the periodic network tasks.
//!
//! Each task sleeps until a clock boundary computed from the current time
//! rather than a fixed interval, so drift from a slow fetch or a missed
//! wake self-corrects on the next round.

use chrono::{NaiveDateTime, Timelike};

/// Seconds until the next local midnight. At exactly 00:00:00 this is a
/// full day, so the daily task never double-fires.
pub fn secs_to_midnight(now: NaiveDateTime) -> u64 {
    let h = u64::from(now.hour());
    let m = u64::from(now.minute());
    let s = u64::from(now.second());
    (23 - h) * 3600 + (59 - m) * 60 + (60 - s)
}

/// Seconds until the next :00 or :30 minute boundary. On an exact
/// boundary this is the full half hour.
pub fn secs_to_half_hour(now: NaiveDateTime) -> u64 {
    let m = u64::from(now.minute());
    let s = u64::from(now.second());
    if m < 30 {
        (30 - m) * 60 - s
    } else {
        (60 - m) * 60 - s
    }
}
