//! Non-volatile settings storage (flash/EEPROM namespace).

/// Opaque blob storage for persisted user settings.
///
/// The codec that gives the blob shape and versioning lives in the
/// `settings` crate; this trait only moves bytes.
pub trait SettingsStore {
    /// Error type.
    type Error: core::fmt::Debug;

    /// Read the stored blob into `buf`. Returns the stored length, or
    /// `None` when no record exists. A record longer than `buf` is reported
    /// as its true length so the caller can detect a size mismatch.
    fn load(&mut self, buf: &mut [u8]) -> Result<Option<usize>, Self::Error>;

    /// Replace the stored blob.
    fn save(&mut self, blob: &[u8]) -> Result<(), Self::Error>;
}
