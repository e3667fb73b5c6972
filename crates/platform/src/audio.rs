//! Audio player abstraction (DFPlayer-class serial module).

/// Volume safety ceiling. Callers clamp or reject above this before a value
/// reaches the hardware module.
pub const MAX_VOLUME: u8 = 30;

/// Audio player collaborator.
pub trait AudioPlayer {
    /// Error type.
    type Error: core::fmt::Debug;

    /// Play one track from a folder at the given volume, once.
    fn play(&mut self, folder: u8, track: u8, volume: u8) -> Result<(), Self::Error>;

    /// Repeat a track until [`AudioPlayer::stop`] is called (alarm ringing).
    fn play_loop(&mut self, track: u8) -> Result<(), Self::Error>;

    /// Stop any playback.
    fn stop(&mut self) -> Result<(), Self::Error>;

    /// Set the output volume (0-[`MAX_VOLUME`]).
    fn set_volume(&mut self, volume: u8) -> Result<(), Self::Error>;
}
