//! In-memory settings store.

use platform::SettingsStore;

/// Error for a scripted write failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreFailure;

/// Settings namespace backed by a `Vec`.
#[derive(Debug, Default)]
pub struct MemStore {
    /// The stored blob, if any. Tests may corrupt or truncate it directly.
    pub blob: Option<Vec<u8>>,
    /// When true, `save` fails.
    pub fail_save: bool,
    /// Number of successful saves.
    pub saves: usize,
}

impl MemStore {
    /// Empty namespace (first boot).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemStore {
    type Error = StoreFailure;

    fn load(&mut self, buf: &mut [u8]) -> Result<Option<usize>, Self::Error> {
        match &self.blob {
            None => Ok(None),
            Some(blob) => {
                let n = blob.len().min(buf.len());
                if let (Some(dst), Some(src)) = (buf.get_mut(..n), blob.get(..n)) {
                    dst.copy_from_slice(src);
                }
                Ok(Some(blob.len()))
            }
        }
    }

    fn save(&mut self, blob: &[u8]) -> Result<(), Self::Error> {
        if self.fail_save {
            return Err(StoreFailure);
        }
        self.blob = Some(blob.to_vec());
        self.saves += 1;
        Ok(())
    }
}
