//! Top-level application modes.

/// What the device is doing with its screen and buttons right now.
///
/// Boot transitions to Clock automatically once init finishes; Clock and
/// Settings swap on button presses. Background tasks run regardless of
/// mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Init sequence; display shows boot status lines.
    #[default]
    Boot,
    /// Normal clock face.
    Clock,
    /// Settings menu is on screen.
    Settings,
}
