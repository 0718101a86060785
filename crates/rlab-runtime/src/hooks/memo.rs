#![forbid(unsafe_code)]

//! Conditional computation gate.
//!
//! One-entry cache keyed on a dependency value. In [`MemoMode::Cached`] the
//! function runs on the first call and whenever the dependency differs from
//! the one it last ran with; in [`MemoMode::Uncached`] it runs every call.
//! There is no expiry. Switching modes is done by building a new gate, which
//! drops the cached result and the counter together.

use std::cell::Cell;

use super::instance::Variant;

/// Whether results are retained between renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoMode {
    Cached,
    Uncached,
}

impl From<Variant> for MemoMode {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Memoized => Self::Cached,
            Variant::Plain => Self::Uncached,
        }
    }
}

/// Counts real invocations of the gated function.
#[derive(Debug, Default)]
pub struct ComputationCounter {
    count: Cell<u64>,
}

impl ComputationCounter {
    fn bump(&self) {
        self.count.set(self.count.get() + 1);
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> u64 {
        self.count.get()
    }
}

/// A dependency-keyed cache of capacity one.
#[derive(Debug)]
pub struct MemoGate<D, T> {
    mode: MemoMode,
    counter: ComputationCounter,
    entry: Option<(D, T)>,
}

impl<D: PartialEq + Clone, T> MemoGate<D, T> {
    #[must_use]
    pub fn new(mode: MemoMode) -> Self {
        Self {
            mode,
            counter: ComputationCounter::default(),
            entry: None,
        }
    }

    /// Produce `f(deps)`, reusing the retained result when allowed.
    pub fn compute(&mut self, deps: &D, f: impl FnOnce(&D) -> T) -> &T {
        let cached = self.mode == MemoMode::Cached;
        let entry = match self.entry.take() {
            Some(entry) if cached && entry.0 == *deps => entry,
            _ => {
                self.counter.bump();
                (deps.clone(), f(deps))
            }
        };
        &self.entry.insert(entry).1
    }

    #[inline]
    pub fn mode(&self) -> MemoMode {
        self.mode
    }

    /// Number of real invocations since this gate was built.
    #[inline]
    pub fn computations(&self) -> u64 {
        self.counter.get()
    }

    /// The most recent result, if any.
    pub fn latest(&self) -> Option<&T> {
        self.entry.as_ref().map(|(_, value)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn cached_runs_once_per_dependency() {
        let mut gate = MemoGate::new(MemoMode::Cached);
        for _ in 0..5 {
            assert_eq!(*gate.compute(&"a".to_string(), |d| d.len()), 1);
        }
        assert_eq!(gate.computations(), 1);
        gate.compute(&"b".to_string(), |d| d.len());
        assert_eq!(gate.computations(), 2);
        gate.compute(&"b".to_string(), |d| d.len());
        assert_eq!(gate.computations(), 2);
    }

    #[test]
    fn cached_returns_retained_result() {
        let mut gate = MemoGate::new(MemoMode::Cached);
        gate.compute(&1u8, |_| vec![1, 2, 3]);
        let again = gate.compute(&1u8, |_| Vec::new());
        assert_eq!(again, &vec![1, 2, 3]);
    }

    #[test]
    fn capacity_is_one() {
        let mut gate = MemoGate::new(MemoMode::Cached);
        gate.compute(&'a', |_| 0);
        gate.compute(&'b', |_| 0);
        gate.compute(&'a', |_| 0);
        assert_eq!(gate.computations(), 3);
    }

    #[test]
    fn rebuilt_gate_starts_clean() {
        let mut gate = MemoGate::new(MemoMode::Uncached);
        gate.compute(&0u8, |_| 0);
        gate.compute(&0u8, |_| 0);
        assert_eq!(gate.computations(), 2);
        let gate: MemoGate<u8, i32> = MemoGate::new(MemoMode::from(Variant::Memoized));
        assert_eq!(gate.computations(), 0);
        assert!(gate.latest().is_none());
        assert_eq!(gate.mode(), MemoMode::Cached);
    }

    proptest! {
        #[test]
        fn uncached_runs_every_render(deps in proptest::collection::vec("[ab]{0,2}", 0..50)) {
            let mut gate = MemoGate::new(MemoMode::Uncached);
            for d in &deps {
                gate.compute(d, |s| s.len());
            }
            prop_assert_eq!(gate.computations(), deps.len() as u64);
        }

        #[test]
        fn cached_runs_once_per_change(deps in proptest::collection::vec("[ab]{0,2}", 1..50)) {
            let mut gate = MemoGate::new(MemoMode::Cached);
            for d in &deps {
                gate.compute(d, |s| s.len());
            }
            let changes = 1 + deps.windows(2).filter(|w| w[0] != w[1]).count() as u64;
            prop_assert_eq!(gate.computations(), changes);
        }
    }
}
