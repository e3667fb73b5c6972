//! Latest-fetch weather cache shared between the refresh task and the
//! display loop.

use core::cell::RefCell;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use platform::WeatherData;

/// Single-slot store: the refresh task publishes, the main loop reads.
/// Starts invalid so the face shows placeholders until the first fetch
/// lands.
pub struct WeatherStore {
    slot: Mutex<CriticalSectionRawMutex, RefCell<WeatherData>>,
}

impl WeatherStore {
    /// Empty store; `get` yields invalid data until `publish` is called.
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(WeatherData::invalid())),
        }
    }

    /// Replace the cached observation.
    pub fn publish(&self, data: WeatherData) {
        self.slot.lock(|slot| {
            *slot.borrow_mut() = data;
        });
    }

    /// Snapshot of the most recent observation.
    pub fn get(&self) -> WeatherData {
        self.slot.lock(|slot| slot.borrow().clone())
    }

    /// Drop the cached observation back to the invalid placeholder.
    pub fn invalidate(&self) {
        self.publish(WeatherData::invalid());
    }
}

impl Default for WeatherStore {
    fn default() -> Self {
        Self::new()
    }
}
