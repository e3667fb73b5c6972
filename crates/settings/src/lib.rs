//! Persisted user settings with a versioned, checksummed blob format.
//!
//! Record layout in the settings store:
//! ```text
//! [0..4]  magic    b"CHIM"
//! [4]     version  u8 = SCHEMA_VERSION
//! [5..n]  body     postcard-encoded UserSettings
//! [n..n+4] crc     u32 le, CRC32 over bytes [0..n]
//! ```
//!
//! Any defect — missing record, bad magic, unknown version, checksum or
//! decode failure, out-of-range field — resolves to validated defaults
//! which are immediately written back, so the store self-heals across
//! schema changes and flash corruption.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]
#![warn(clippy::all)]

use platform::{SettingsStore, Units, MAX_VOLUME};
use serde::{Deserialize, Serialize};

/// Bumped on any change to the `UserSettings` encoding.
pub const SCHEMA_VERSION: u8 = 1;

/// Record magic bytes.
pub const MAGIC: &[u8; 4] = b"CHIM";

/// Upper bound on the encoded record. The postcard body is well under
/// this; the margin absorbs future fields without a layout change.
pub const MAX_BLOB_LEN: usize = 64;

const HEADER_LEN: usize = 5;
const CRC_LEN: usize = 4;

/// Display backlight policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BrightnessMode {
    /// Follow the ambient light sensor.
    Auto,
    /// Fixed level, 0–255.
    Manual(u8),
}

/// Everything the user can configure, persisted across power loss.
///
/// The alarm time itself lives in the RTC's battery-backed registers,
/// not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UserSettings {
    /// Track number of the alarm song on the audio module.
    pub alarm_song: u8,
    /// Playback volume, 0–30.
    pub volume: u8,
    /// 24-hour clock face instead of 12-hour.
    pub use_24h: bool,
    /// Backlight policy.
    pub brightness: BrightnessMode,
    /// Minutes of undismissed ringing before the volume escalates.
    pub snooze_minutes: u8,
    /// Whether the weather refresh task runs at all.
    pub weather_enabled: bool,
    /// Temperature units for fetch and display.
    pub units: Units,
    /// Keep the Wi-Fi radio up between sessions.
    pub wifi_persistent: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            alarm_song: 1,
            volume: 20,
            use_24h: true,
            brightness: BrightnessMode::Auto,
            snooze_minutes: 5,
            weather_enabled: true,
            units: Units::Celsius,
            wifi_persistent: false,
        }
    }
}

impl UserSettings {
    /// Range check every field. A decoded record that fails this is
    /// treated exactly like a corrupt one.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.alarm_song >= 1
            && self.volume <= MAX_VOLUME
            && (1..=60).contains(&self.snooze_minutes)
    }
}

/// How `load` arrived at the settings it returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A valid stored record was decoded.
    Loaded,
    /// Defaults were substituted (and re-saved) for the given reason.
    Reset(ResetReason),
}

/// Why a stored record was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    /// No record in the store.
    Missing,
    /// Stored length outside the plausible record range.
    BadLength,
    /// Magic bytes were not `b"CHIM"`.
    BadMagic,
    /// Version byte not understood by this firmware.
    VersionMismatch,
    /// CRC32 trailer did not match.
    BadCrc,
    /// Postcard body failed to decode.
    DecodeFailed,
    /// Decoded cleanly but a field was out of range.
    OutOfRange,
}

/// Encode `settings` into `buf`, returning the record slice.
///
/// `None` only if `buf` is too small for the record, which cannot happen
/// for a `MAX_BLOB_LEN` buffer.
#[must_use]
pub fn encode<'a>(settings: &UserSettings, buf: &'a mut [u8]) -> Option<&'a [u8]> {
    if buf.len() < HEADER_LEN {
        return None;
    }
    let (header, rest) = buf.split_at_mut(HEADER_LEN);
    header.get_mut(0..4)?.copy_from_slice(MAGIC);
    *header.get_mut(4)? = SCHEMA_VERSION;

    let body_len = postcard::to_slice(settings, rest).ok()?.len();
    let payload_len = HEADER_LEN.checked_add(body_len)?;

    let crc = crc32fast::hash(buf.get(..payload_len)?);
    let total = payload_len.checked_add(CRC_LEN)?;
    buf.get_mut(payload_len..total)?
        .copy_from_slice(&crc.to_le_bytes());
    buf.get(..total)
}

/// Decode a stored record. Pure; store interaction lives in [`load`].
pub fn decode(blob: &[u8]) -> Result<UserSettings, ResetReason> {
    if blob.len() < HEADER_LEN + CRC_LEN {
        return Err(ResetReason::BadLength);
    }
    let (payload, trailer) = blob.split_at(blob.len() - CRC_LEN);
    let stored_crc = u32::from_le_bytes(trailer.try_into().map_err(|_| ResetReason::BadCrc)?);
    if crc32fast::hash(payload) != stored_crc {
        return Err(ResetReason::BadCrc);
    }
    if payload.get(0..4) != Some(MAGIC.as_ref()) {
        return Err(ResetReason::BadMagic);
    }
    if payload.get(4).copied() != Some(SCHEMA_VERSION) {
        return Err(ResetReason::VersionMismatch);
    }
    let body = payload.get(HEADER_LEN..).ok_or(ResetReason::BadLength)?;
    let settings: UserSettings =
        postcard::from_bytes(body).map_err(|_| ResetReason::DecodeFailed)?;
    if !settings.is_valid() {
        return Err(ResetReason::OutOfRange);
    }
    Ok(settings)
}

/// Write `settings` to the store.
pub fn save<S: SettingsStore>(settings: &UserSettings, store: &mut S) -> Result<(), S::Error> {
    let mut buf = [0u8; MAX_BLOB_LEN];
    match encode(settings, &mut buf) {
        Some(record) => store.save(record),
        // Structurally unreachable for a MAX_BLOB_LEN buffer.
        None => Ok(()),
    }
}

/// Read settings from the store, falling back to defaults.
///
/// On any rejection the defaults are re-saved immediately so the next
/// boot loads cleanly. A store that cannot even save is logged and
/// otherwise ignored; the in-memory defaults still apply.
pub fn load<S: SettingsStore>(store: &mut S) -> (UserSettings, LoadOutcome) {
    let mut buf = [0u8; MAX_BLOB_LEN];
    let reason = match store.load(&mut buf) {
        Ok(None) => ResetReason::Missing,
        Ok(Some(len)) if len > MAX_BLOB_LEN => ResetReason::BadLength,
        Ok(Some(len)) => match buf.get(..len) {
            Some(blob) => match decode(blob) {
                Ok(settings) => return (settings, LoadOutcome::Loaded),
                Err(reason) => reason,
            },
            None => ResetReason::BadLength,
        },
        Err(err) => {
            log::warn!("settings load failed: {err:?}");
            ResetReason::Missing
        }
    };

    log::warn!("settings reset to defaults: {reason:?}");
    let defaults = UserSettings::default();
    if let Err(err) = save(&defaults, store) {
        log::warn!("settings re-save failed: {err:?}");
    }
    (defaults, LoadOutcome::Reset(reason))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use fakes::MemStore;
    use proptest::prelude::*;

    fn custom() -> UserSettings {
        UserSettings {
            alarm_song: 3,
            volume: 12,
            use_24h: false,
            brightness: BrightnessMode::Manual(80),
            snooze_minutes: 9,
            weather_enabled: false,
            units: Units::Fahrenheit,
            wifi_persistent: true,
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = MemStore::new();
        save(&custom(), &mut store).unwrap();
        let (loaded, outcome) = load(&mut store);
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(loaded, custom());
    }

    #[test]
    fn missing_record_resets_and_resaves() {
        let mut store = MemStore::new();
        let (loaded, outcome) = load(&mut store);
        assert_eq!(outcome, LoadOutcome::Reset(ResetReason::Missing));
        assert_eq!(loaded, UserSettings::default());
        assert_eq!(store.saves, 1, "defaults written back");
        assert_eq!(load(&mut store).1, LoadOutcome::Loaded);
    }

    #[test]
    fn corrupt_body_resets() {
        let mut store = MemStore::new();
        save(&custom(), &mut store).unwrap();
        let blob = store.blob.as_mut().unwrap();
        let mid = blob.len() / 2;
        blob[mid] ^= 0xFF;
        let (loaded, outcome) = load(&mut store);
        assert_eq!(outcome, LoadOutcome::Reset(ResetReason::BadCrc));
        assert_eq!(loaded, UserSettings::default());
    }

    #[test]
    fn bad_magic_rejected() {
        let mut store = MemStore::new();
        save(&custom(), &mut store).unwrap();
        {
            let blob = store.blob.as_mut().unwrap();
            blob[0] = b'X';
            // Re-seal so only the magic is wrong.
            let len = blob.len();
            let crc = crc32fast::hash(&blob[..len - 4]);
            blob[len - 4..].copy_from_slice(&crc.to_le_bytes());
        }
        assert_eq!(
            load(&mut store).1,
            LoadOutcome::Reset(ResetReason::BadMagic)
        );
    }

    #[test]
    fn version_bump_rejected() {
        let mut store = MemStore::new();
        save(&custom(), &mut store).unwrap();
        {
            let blob = store.blob.as_mut().unwrap();
            blob[4] = SCHEMA_VERSION + 1;
            let len = blob.len();
            let crc = crc32fast::hash(&blob[..len - 4]);
            blob[len - 4..].copy_from_slice(&crc.to_le_bytes());
        }
        assert_eq!(
            load(&mut store).1,
            LoadOutcome::Reset(ResetReason::VersionMismatch)
        );
    }

    #[test]
    fn truncated_record_rejected() {
        let mut store = MemStore::new();
        save(&custom(), &mut store).unwrap();
        store.blob.as_mut().unwrap().truncate(6);
        assert_eq!(
            load(&mut store).1,
            LoadOutcome::Reset(ResetReason::BadLength)
        );
    }

    #[test]
    fn out_of_range_volume_rejected() {
        let mut bad = custom();
        bad.volume = MAX_VOLUME + 1;
        let mut buf = [0u8; MAX_BLOB_LEN];
        let record = encode(&bad, &mut buf).unwrap().to_vec();
        let mut store = MemStore::new();
        store.blob = Some(record);
        assert_eq!(
            load(&mut store).1,
            LoadOutcome::Reset(ResetReason::OutOfRange)
        );
    }

    #[test]
    fn failed_resave_still_yields_defaults() {
        let mut store = MemStore::new();
        store.fail_save = true;
        let (loaded, outcome) = load(&mut store);
        assert_eq!(outcome, LoadOutcome::Reset(ResetReason::Missing));
        assert_eq!(loaded, UserSettings::default());
    }

    #[test]
    fn record_fits_blob_bound() {
        let mut buf = [0u8; MAX_BLOB_LEN];
        let record = encode(&custom(), &mut buf).unwrap();
        assert!(record.len() <= MAX_BLOB_LEN);
        assert_eq!(&record[0..4], MAGIC);
        assert_eq!(record[4], SCHEMA_VERSION);
    }

    proptest! {
        #[test]
        fn prop_valid_settings_round_trip(
            alarm_song in 1u8..=99,
            volume in 0u8..=MAX_VOLUME,
            use_24h: bool,
            manual in proptest::option::of(0u8..=255),
            snooze_minutes in 1u8..=60,
            weather_enabled: bool,
            fahrenheit: bool,
            wifi_persistent: bool,
        ) {
            let settings = UserSettings {
                alarm_song,
                volume,
                use_24h,
                brightness: match manual {
                    Some(level) => BrightnessMode::Manual(level),
                    None => BrightnessMode::Auto,
                },
                snooze_minutes,
                weather_enabled,
                units: if fahrenheit { Units::Fahrenheit } else { Units::Celsius },
                wifi_persistent,
            };
            let mut buf = [0u8; MAX_BLOB_LEN];
            let record = encode(&settings, &mut buf).unwrap();
            prop_assert_eq!(decode(record).unwrap(), settings);
        }

        #[test]
        fn prop_single_bit_flip_never_decodes(flip_byte in 0usize..16, flip_bit in 0u8..8) {
            let mut buf = [0u8; MAX_BLOB_LEN];
            let record = encode(&UserSettings::default(), &mut buf).unwrap().to_vec();
            let mut mutated = record.clone();
            let idx = flip_byte % mutated.len();
            mutated[idx] ^= 1 << flip_bit;
            prop_assert!(decode(&mutated).is_err());
        }
    }
}
