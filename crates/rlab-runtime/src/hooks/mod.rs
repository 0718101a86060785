#![forbid(unsafe_code)]

//! Render instrumentation hooks.
//!
//! Two mutation channels exist side by side:
//!
//! - **Reactive**: [`State::set`](state::State::set) signals the
//!   [`RenderScheduler`](state::RenderScheduler), so the runtime runs one
//!   render pass that sees the new value.
//! - **Out-of-band**: [`RenderCounter`](render_counter::RenderCounter),
//!   [`ComputationCounter`](memo::ComputationCounter) and
//!   [`RenderFlash`](flash::RenderFlash) mutate through `Cell`s and never
//!   signal the scheduler, so bookkeeping cannot cause renders.

pub mod callback;
pub mod flash;
pub mod instance;
pub mod memo;
pub mod prop;
pub mod render_counter;
pub mod render_reason;
pub mod state;

pub use callback::{CallbackGate, CallbackMode};
pub use flash::{FLASH_TICKS, RenderFlash};
pub use instance::{InstanceSlot, Variant};
pub use memo::{ComputationCounter, MemoGate, MemoMode};
pub use prop::{Callback, Prop};
pub use render_counter::RenderCounter;
pub use render_reason::{PropSnapshot, RenderReason, classify};
pub use state::{RenderScheduler, State};

/// Identifies one render pass.
///
/// Pass ids are strictly increasing within one [`PassClock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PassId(u64);

impl PassId {
    /// The raw pass number (1 for the first pass).
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Context handed to `Model::render` for one render pass.
#[derive(Debug, Clone, Copy)]
pub struct RenderCx {
    pass: PassId,
}

impl RenderCx {
    /// The pass being rendered.
    #[inline]
    pub const fn pass(&self) -> PassId {
        self.pass
    }
}

/// Source of render pass ids.
#[derive(Debug, Default)]
pub struct PassClock {
    last: u64,
}

impl PassClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new render pass.
    pub fn begin(&mut self) -> RenderCx {
        self.last += 1;
        RenderCx {
            pass: PassId(self.last),
        }
    }

    /// Number of passes begun so far.
    #[inline]
    pub fn passes(&self) -> u64 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_ids_increase() {
        let mut clock = PassClock::new();
        let a = clock.begin().pass();
        let b = clock.begin().pass();
        assert!(b > a);
        assert_eq!(a.get(), 1);
        assert_eq!(clock.passes(), 2);
    }
}
