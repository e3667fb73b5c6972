//! Fake audio player that records every command.

use platform::AudioPlayer;

/// One recorded player command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCall {
    /// `play(folder, track, volume)`
    Play(u8, u8, u8),
    /// `play_loop(track)`
    Loop(u8),
    /// `stop()`
    Stop,
    /// `set_volume(volume)`
    SetVolume(u8),
}

/// Recording audio player.
#[derive(Debug, Default)]
pub struct FakeAudio {
    /// Every call, in order.
    pub calls: Vec<AudioCall>,
    /// Whether something is currently playing.
    pub playing: bool,
    /// Last volume set.
    pub volume: u8,
}

impl FakeAudio {
    /// Fresh, silent player.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent call, if any.
    #[must_use]
    pub fn last(&self) -> Option<AudioCall> {
        self.calls.last().copied()
    }
}

impl AudioPlayer for FakeAudio {
    type Error = core::convert::Infallible;

    fn play(&mut self, folder: u8, track: u8, volume: u8) -> Result<(), Self::Error> {
        self.calls.push(AudioCall::Play(folder, track, volume));
        self.playing = true;
        self.volume = volume;
        Ok(())
    }

    fn play_loop(&mut self, track: u8) -> Result<(), Self::Error> {
        self.calls.push(AudioCall::Loop(track));
        self.playing = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.calls.push(AudioCall::Stop);
        self.playing = false;
        Ok(())
    }

    fn set_volume(&mut self, volume: u8) -> Result<(), Self::Error> {
        self.calls.push(AudioCall::SetVolume(volume));
        self.volume = volume;
        Ok(())
    }
}
