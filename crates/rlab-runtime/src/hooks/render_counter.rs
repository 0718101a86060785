#![forbid(unsafe_code)]

//! Per-instance render counter.

use std::cell::Cell;

use super::PassId;

/// Counts the render passes of one component instance.
///
/// The count lives in a `Cell`, outside the reactive state channel:
/// recording a render never requests another one. A fresh counter starts at
/// zero; recreating the owning instance is the only way to reset it.
#[derive(Debug, Default)]
pub struct RenderCounter {
    count: Cell<u64>,
    last_pass: Cell<Option<PassId>>,
}

impl RenderCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the owner rendered during `pass`.
    ///
    /// Idempotent within a pass: a second call with the same `PassId` leaves
    /// the count unchanged and logs a warning. Returns the current count.
    pub fn record(&self, pass: PassId) -> u64 {
        if self.last_pass.get() == Some(pass) {
            tracing::warn!(
                pass = pass.get(),
                count = self.count.get(),
                "render counter recorded twice in one pass; ignoring"
            );
            return self.count.get();
        }
        self.last_pass.set(Some(pass));
        let next = self.count.get() + 1;
        self.count.set(next);
        next
    }

    /// Current count.
    #[inline]
    #[must_use]
    pub fn get(&self) -> u64 {
        self.count.get()
    }

    /// Whether the owner rendered during `pass`.
    #[inline]
    #[must_use]
    pub fn rendered_in(&self, pass: PassId) -> bool {
        self.last_pass.get() == Some(pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::PassClock;
    use proptest::prelude::*;

    #[test]
    fn starts_at_zero() {
        assert_eq!(RenderCounter::new().get(), 0);
    }

    #[test]
    fn double_record_in_one_pass_counts_once() {
        let mut clock = PassClock::new();
        let counter = RenderCounter::new();
        let cx = clock.begin();
        assert_eq!(counter.record(cx.pass()), 1);
        assert_eq!(counter.record(cx.pass()), 1);
        assert_eq!(counter.get(), 1);
        assert!(counter.rendered_in(cx.pass()));

        let next = clock.begin();
        assert!(!counter.rendered_in(next.pass()));
        assert_eq!(counter.record(next.pass()), 2);
    }

    proptest! {
        #[test]
        fn count_equals_passes_rendered(renders in proptest::collection::vec((any::<bool>(), 1usize..4), 0..64)) {
            // Each entry: whether the owner renders in this pass, and how many
            // times the body calls `record` (re-entrant calls must not count).
            let mut clock = PassClock::new();
            let counter = RenderCounter::new();
            let mut expected = 0u64;
            for (renders_now, calls) in renders {
                let cx = clock.begin();
                if renders_now {
                    expected += 1;
                    for _ in 0..calls {
                        counter.record(cx.pass());
                    }
                }
                prop_assert_eq!(counter.get(), expected);
            }
        }
    }
}
