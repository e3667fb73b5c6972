//! Fixed command table and dispatch.

use core::fmt::Write;

use platform::MAX_VOLUME;

use crate::line::MAX_LINE_LEN;
use crate::reply::Reply;

const MAX_ARGS: usize = 8;

/// Dispatch selector for a table entry. A name resolves to a command
/// only through the table scan, so every entry must carry a kind and
/// every kind must have a dispatch arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Help,
    Status,
    Alarm,
    Volume,
    Play,
    Stop,
    Sync,
    WifiSession,
}

/// One entry in the command table.
#[derive(Debug, Clone, Copy)]
pub struct Command {
    /// Token that selects the command.
    pub name: &'static str,
    /// Usage line shown by `help`.
    pub usage: &'static str,
    kind: Kind,
}

/// The full command table, scanned linearly.
pub const COMMANDS: &[Command] = &[
    Command { name: "help", usage: "help - list commands", kind: Kind::Help },
    Command { name: "status", usage: "status - time, alarm, wifi summary", kind: Kind::Status },
    Command { name: "alarm", usage: "alarm set <hour> <minute> | alarm disable", kind: Kind::Alarm },
    Command { name: "vol", usage: "vol <0-30> - set playback volume", kind: Kind::Volume },
    Command { name: "play", usage: "play <folder> <track> [volume]", kind: Kind::Play },
    Command { name: "stop", usage: "stop - stop playback", kind: Kind::Stop },
    Command { name: "sync", usage: "sync time | sync weather", kind: Kind::Sync },
    Command { name: "wifisession", usage: "wifisession on|off - persistent wifi", kind: Kind::WifiSession },
];

/// The firmware side of the command interface.
///
/// Dispatch validates syntax and ranges; hosts only see well-formed
/// requests and report whether the hardware went along.
pub trait Host {
    /// Append the status summary to `out`.
    fn status(&mut self, out: &mut Reply);
    /// Program and enable the alarm. Arguments are pre-validated.
    fn set_alarm(&mut self, hour: u8, minute: u8) -> bool;
    /// Clear and disable the alarm.
    fn disable_alarm(&mut self) -> bool;
    /// Set playback volume. Pre-validated against [`MAX_VOLUME`].
    fn set_volume(&mut self, volume: u8) -> bool;
    /// One-shot track playback.
    fn play(&mut self, folder: u8, track: u8, volume: Option<u8>) -> bool;
    /// Stop playback (alarm or one-shot).
    fn stop_playback(&mut self);
    /// Force a network time sync now.
    async fn sync_time(&mut self) -> bool;
    /// Force a weather refresh now.
    async fn sync_weather(&mut self) -> bool;
    /// Toggle persistent wifi mode.
    async fn set_wifi_persistent(&mut self, on: bool) -> bool;
}

/// Digits-only whole-token parse; `"7x"` and `"+7"` both fail.
fn parse_num<T: core::str::FromStr>(token: &str) -> Option<T> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Run one input line. `None` for blank input (no reply at all).
pub async fn dispatch<H: Host>(line: &str, host: &mut H) -> Option<Reply> {
    let mut lowered = heapless::String::<MAX_LINE_LEN>::new();
    for c in line.chars() {
        if lowered.push(c.to_ascii_lowercase()).is_err() {
            break;
        }
    }

    let mut tokens = lowered.split_whitespace();
    let name = tokens.next()?;
    let mut args: heapless::Vec<&str, MAX_ARGS> = heapless::Vec::new();
    let mut reply = Reply::new();
    for token in tokens {
        if args.push(token).is_err() {
            reply.push_str("too many arguments.");
            return Some(reply);
        }
    }

    let Some(cmd) = COMMANDS.iter().find(|c| c.name == name) else {
        let _ = write!(reply, "command {name} not recognized.");
        return Some(reply);
    };

    match cmd.kind {
        Kind::Help => {
            reply.push_str("commands:");
            for entry in COMMANDS {
                reply.push_str("\n  ");
                reply.push_str(entry.usage);
            }
        }
        Kind::Status => host.status(&mut reply),
        Kind::Alarm => run_alarm(&args, host, &mut reply),
        Kind::Volume => run_vol(&args, host, &mut reply),
        Kind::Play => run_play(&args, host, &mut reply),
        Kind::Stop => {
            host.stop_playback();
            reply.push_str("playback stopped.");
        }
        Kind::Sync => match args.first().copied() {
            Some("time") => {
                if host.sync_time().await {
                    reply.push_str("time synchronized.");
                } else {
                    reply.push_str("time sync failed.");
                }
            }
            Some("weather") => {
                if host.sync_weather().await {
                    reply.push_str("weather updated.");
                } else {
                    reply.push_str("weather update failed.");
                }
            }
            _ => reply.push_str("usage: sync time | sync weather."),
        },
        Kind::WifiSession => match args.first().copied() {
            Some(word @ ("on" | "off")) => {
                let on = word == "on";
                if host.set_wifi_persistent(on).await {
                    let _ = write!(reply, "wifi session persistent: {word}.");
                } else {
                    reply.push_str("wifi session change failed.");
                }
            }
            _ => reply.push_str("usage: wifisession on|off."),
        },
    }
    Some(reply)
}

fn run_alarm<H: Host>(args: &[&str], host: &mut H, reply: &mut Reply) {
    match args.first().copied() {
        Some("set") => {
            let hour = args.get(1).and_then(|t| parse_num::<u8>(t));
            let minute = args.get(2).and_then(|t| parse_num::<u8>(t));
            match (hour, minute) {
                (Some(h), Some(m)) if h > 23 || m > 59 => {
                    let _ = write!(reply, "alarm time {h:02}:{m:02} out of range.");
                }
                (Some(h), Some(m)) => {
                    if host.set_alarm(h, m) {
                        let _ = write!(reply, "alarm set to {h:02}:{m:02}.");
                    } else {
                        reply.push_str("alarm set failed.");
                    }
                }
                _ => reply.push_str("usage: alarm set <hour 0-23> <minute 0-59>."),
            }
        }
        Some("disable") => {
            if host.disable_alarm() {
                reply.push_str("alarm disabled.");
            } else {
                reply.push_str("alarm disable failed.");
            }
        }
        _ => reply.push_str("usage: alarm set <hour> <minute> | alarm disable."),
    }
}

fn run_vol<H: Host>(args: &[&str], host: &mut H, reply: &mut Reply) {
    match args.first().and_then(|t| parse_num::<u8>(t)) {
        Some(v) if v > MAX_VOLUME => {
            let _ = write!(reply, "volume {v} out of range (0-{MAX_VOLUME}).");
        }
        Some(v) => {
            if host.set_volume(v) {
                let _ = write!(reply, "volume set to {v}.");
            } else {
                reply.push_str("volume change failed.");
            }
        }
        None => reply.push_str("usage: vol <0-30>."),
    }
}

fn run_play<H: Host>(args: &[&str], host: &mut H, reply: &mut Reply) {
    let folder = args.first().and_then(|t| parse_num::<u8>(t));
    let track = args.get(1).and_then(|t| parse_num::<u8>(t));
    let mut volume = None;
    if let Some(t) = args.get(2) {
        match parse_num::<u8>(t) {
            Some(v) if v > MAX_VOLUME => {
                let _ = write!(reply, "volume {v} out of range (0-{MAX_VOLUME}).");
                return;
            }
            Some(v) => volume = Some(v),
            None => {
                reply.push_str("usage: play <folder> <track> [volume 0-30].");
                return;
            }
        }
    }
    match (folder, track) {
        (Some(f), Some(t)) => {
            if host.play(f, t, volume) {
                let _ = write!(reply, "playing folder {f} track {t}.");
            } else {
                reply.push_str("playback failed.");
            }
        }
        _ => reply.push_str("usage: play <folder> <track> [volume 0-30]."),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct ScriptHost {
        alarm: Option<(u8, u8)>,
        alarm_disabled: bool,
        volume: Option<u8>,
        played: Option<(u8, u8, Option<u8>)>,
        stopped: bool,
        wifi_persistent: Option<bool>,
        sync_time_result: bool,
        sync_weather_result: bool,
        refuse_hardware: bool,
    }

    impl Host for ScriptHost {
        fn status(&mut self, out: &mut Reply) {
            out.push_str("12:34 alarm 07:30 on wifi down");
        }
        fn set_alarm(&mut self, hour: u8, minute: u8) -> bool {
            if self.refuse_hardware {
                return false;
            }
            self.alarm = Some((hour, minute));
            true
        }
        fn disable_alarm(&mut self) -> bool {
            self.alarm_disabled = true;
            true
        }
        fn set_volume(&mut self, volume: u8) -> bool {
            self.volume = Some(volume);
            true
        }
        fn play(&mut self, folder: u8, track: u8, volume: Option<u8>) -> bool {
            self.played = Some((folder, track, volume));
            true
        }
        fn stop_playback(&mut self) {
            self.stopped = true;
        }
        async fn sync_time(&mut self) -> bool {
            self.sync_time_result
        }
        async fn sync_weather(&mut self) -> bool {
            self.sync_weather_result
        }
        async fn set_wifi_persistent(&mut self, on: bool) -> bool {
            self.wifi_persistent = Some(on);
            true
        }
    }

    async fn run(line: &str, host: &mut ScriptHost) -> Option<String> {
        dispatch(line, host).await.map(|r| r.as_str().to_owned())
    }

    #[tokio::test]
    async fn test_blank_line_no_reply() {
        let mut host = ScriptHost::default();
        assert_eq!(run("", &mut host).await, None);
        assert_eq!(run("   ", &mut host).await, None);
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let mut host = ScriptHost::default();
        let reply = run("frobnicate now", &mut host).await.unwrap();
        assert_eq!(reply, "[CLK]: command frobnicate not recognized.");
    }

    #[tokio::test]
    async fn test_case_insensitive() {
        let mut host = ScriptHost::default();
        let reply = run("ALARM SET 7 30", &mut host).await.unwrap();
        assert_eq!(reply, "[CLK]: alarm set to 07:30.");
        assert_eq!(host.alarm, Some((7, 30)));
    }

    #[tokio::test]
    async fn test_alarm_set_out_of_range_no_mutation() {
        let mut host = ScriptHost::default();
        let reply = run("alarm set 25 00", &mut host).await.unwrap();
        assert_eq!(reply, "[CLK]: alarm time 25:00 out of range.");
        assert_eq!(host.alarm, None);

        let reply = run("alarm set 7 60", &mut host).await.unwrap();
        assert_eq!(reply, "[CLK]: alarm time 07:60 out of range.");
        assert_eq!(host.alarm, None);
    }

    #[tokio::test]
    async fn test_alarm_set_rejects_partial_numeric_token() {
        let mut host = ScriptHost::default();
        let reply = run("alarm set 7x 30", &mut host).await.unwrap();
        assert!(reply.contains("usage"));
        assert_eq!(host.alarm, None);
    }

    #[tokio::test]
    async fn test_alarm_hardware_refusal_reported() {
        let mut host = ScriptHost { refuse_hardware: true, ..Default::default() };
        let reply = run("alarm set 6 15", &mut host).await.unwrap();
        assert_eq!(reply, "[CLK]: alarm set failed.");
    }

    #[tokio::test]
    async fn test_alarm_disable() {
        let mut host = ScriptHost::default();
        let reply = run("alarm disable", &mut host).await.unwrap();
        assert_eq!(reply, "[CLK]: alarm disabled.");
        assert!(host.alarm_disabled);
    }

    #[tokio::test]
    async fn test_vol_boundary() {
        let mut host = ScriptHost::default();
        let reply = run("vol 31", &mut host).await.unwrap();
        assert_eq!(reply, "[CLK]: volume 31 out of range (0-30).");
        assert_eq!(host.volume, None);

        let reply = run("vol abc", &mut host).await.unwrap();
        assert!(reply.contains("usage"));
        assert_eq!(host.volume, None);

        let reply = run("vol 15", &mut host).await.unwrap();
        assert_eq!(reply, "[CLK]: volume set to 15.");
        assert_eq!(host.volume, Some(15));

        let reply = run("vol 30", &mut host).await.unwrap();
        assert_eq!(reply, "[CLK]: volume set to 30.");
    }

    #[tokio::test]
    async fn test_play_with_and_without_volume() {
        let mut host = ScriptHost::default();
        run("play 2 14 25", &mut host).await.unwrap();
        assert_eq!(host.played, Some((2, 14, Some(25))));

        run("play 1 3", &mut host).await.unwrap();
        assert_eq!(host.played, Some((1, 3, None)));
    }

    #[tokio::test]
    async fn test_play_rejects_bad_volume() {
        let mut host = ScriptHost::default();
        let reply = run("play 2 14 99", &mut host).await.unwrap();
        assert_eq!(reply, "[CLK]: volume 99 out of range (0-30).");
        assert_eq!(host.played, None);

        let reply = run("play 2 14 loud", &mut host).await.unwrap();
        assert!(reply.contains("usage"));
        assert_eq!(host.played, None);
    }

    #[tokio::test]
    async fn test_stop() {
        let mut host = ScriptHost::default();
        let reply = run("stop", &mut host).await.unwrap();
        assert_eq!(reply, "[CLK]: playback stopped.");
        assert!(host.stopped);
    }

    #[tokio::test]
    async fn test_sync_variants() {
        let mut host = ScriptHost { sync_time_result: true, ..Default::default() };
        assert_eq!(
            run("sync time", &mut host).await.unwrap(),
            "[CLK]: time synchronized."
        );
        assert_eq!(
            run("sync weather", &mut host).await.unwrap(),
            "[CLK]: weather update failed."
        );
        assert!(run("sync", &mut host).await.unwrap().contains("usage"));
    }

    #[tokio::test]
    async fn test_wifisession() {
        let mut host = ScriptHost::default();
        assert_eq!(
            run("wifisession on", &mut host).await.unwrap(),
            "[CLK]: wifi session persistent: on."
        );
        assert_eq!(host.wifi_persistent, Some(true));
        assert!(run("wifisession maybe", &mut host).await.unwrap().contains("usage"));
    }

    #[tokio::test]
    async fn test_too_many_arguments() {
        let mut host = ScriptHost::default();
        let reply = run("play 1 2 3 4 5 6 7 8 9", &mut host).await.unwrap();
        assert_eq!(reply, "[CLK]: too many arguments.");
    }

    #[tokio::test]
    async fn test_help_lists_every_command() {
        let mut host = ScriptHost::default();
        let reply = run("help", &mut host).await.unwrap();
        for cmd in COMMANDS {
            assert!(reply.contains(cmd.name), "missing {}", cmd.name);
        }
    }

    #[tokio::test]
    async fn test_every_table_entry_dispatches() {
        for cmd in COMMANDS {
            let mut host = ScriptHost::default();
            let reply = run(cmd.name, &mut host).await.unwrap();
            assert!(
                !reply.contains("not recognized"),
                "table entry {} has no dispatch arm",
                cmd.name
            );
        }
    }

    #[tokio::test]
    async fn test_status_delegates_to_host() {
        let mut host = ScriptHost::default();
        let reply = run("status", &mut host).await.unwrap();
        assert_eq!(reply, "[CLK]: 12:34 alarm 07:30 on wifi down");
    }
}
