#![forbid(unsafe_code)]

//! Render flash: a short highlight on components that just rendered.
//!
//! A flash starts when the owner's render count advanced during the latest
//! render pass and lasts [`FLASH_TICKS`] ticks. The mount render (the first
//! count observed) does not flash. Ticks only repaint; they are
//! never render passes, so expiring a flash cannot advance any counter or
//! retrigger the flash.

use std::cell::Cell;

/// Ticks a flash stays visible.
pub const FLASH_TICKS: u8 = 3;

#[derive(Debug, Default)]
pub struct RenderFlash {
    last_seen: Cell<Option<u64>>,
    remaining: Cell<u8>,
}

impl RenderFlash {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare against the owner's render count after a pass.
    ///
    /// Returns `true` if a flash started.
    pub fn observe(&self, render_count: u64) -> bool {
        match self.last_seen.replace(Some(render_count)) {
            Some(seen) if seen != render_count => {
                self.remaining.set(FLASH_TICKS);
                true
            }
            _ => false,
        }
    }

    /// Advance one tick. Returns `true` if the flash was visible before the
    /// tick, i.e. the next paint may look different.
    pub fn tick(&self) -> bool {
        let remaining = self.remaining.get();
        if remaining == 0 {
            return false;
        }
        self.remaining.set(remaining - 1);
        true
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.remaining.get() > 0
    }
}
