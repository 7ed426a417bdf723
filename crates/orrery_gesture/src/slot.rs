//! Shared latest-sample slot
//!
//! The one piece of state shared between the channel task and the render
//! loop. Last writer wins: the channel overwrites the whole record on every
//! inbound sample, the render loop copies it out once per frame. Samples
//! arriving faster than the frame rate are simply superseded - the smoothing
//! stage downstream absorbs the discontinuities.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::sample::ControlSample;

/// Cloneable handle to the single shared gesture target.
///
/// The slot starts out holding `ControlSample::default()`, so a reader always
/// gets a usable target even before the first message arrives. Reads and
/// writes swap the whole record under one lock; a reader can never observe a
/// partially written sample.
#[derive(Clone, Debug, Default)]
pub struct GestureSlot {
    inner: Arc<Mutex<ControlSample>>,
}

impl GestureSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the slot with a new sample.
    pub fn store(&self, sample: ControlSample) {
        *self.inner.lock() = sample;
    }

    /// Copy out the most recent sample.
    pub fn load(&self) -> ControlSample {
        *self.inner.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_default_target() {
        let slot = GestureSlot::new();
        assert_eq!(slot.load(), ControlSample::default());
    }

    #[test]
    fn test_last_write_wins() {
        let slot = GestureSlot::new();

        for zoom in [10.0, 20.0, 30.0, 99.0] {
            slot.store(ControlSample {
                zoom,
                rotate_x: 0.0,
                rotate_y: 0.0,
            });
        }

        assert_eq!(slot.load().zoom, 99.0);
    }

    #[test]
    fn test_shared_across_threads() {
        let slot = GestureSlot::new();
        let writer = slot.clone();

        let handle = std::thread::spawn(move || {
            writer.store(ControlSample {
                zoom: 42.0,
                rotate_x: 1.0,
                rotate_y: 2.0,
            });
        });
        handle.join().unwrap();

        assert_eq!(slot.load().zoom, 42.0);
    }
}
