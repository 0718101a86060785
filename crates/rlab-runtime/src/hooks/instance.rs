#![forbid(unsafe_code)]

//! Explicit component identity.
//!
//! A playground's optimization toggle selects between a plain and a
//! memoized variant of the same component. The slot treats a variant change
//! as a new instance: the old component, and every counter it owns, is
//! dropped and a fresh one is built.

use std::fmt;

/// Which implementation of a component is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Plain,
    Memoized,
}

impl Variant {
    /// `Memoized` when the optimization is enabled.
    #[must_use]
    pub const fn from_enabled(enabled: bool) -> Self {
        if enabled { Self::Memoized } else { Self::Plain }
    }

    #[must_use]
    pub const fn is_memoized(self) -> bool {
        matches!(self, Self::Memoized)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Memoized => "memoized",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Holds the mounted instance of a component together with its variant.
pub struct InstanceSlot<C> {
    variant: Variant,
    instance: C,
    generation: u64,
}

impl<C> InstanceSlot<C> {
    /// Mount the first instance.
    pub fn new(variant: Variant, make: impl FnOnce(Variant) -> C) -> Self {
        Self {
            variant,
            instance: make(variant),
            generation: 1,
        }
    }

    /// Make sure the mounted instance is of `variant`.
    ///
    /// Returns `true` when the instance was recreated.
    pub fn ensure(&mut self, variant: Variant, make: impl FnOnce(Variant) -> C) -> bool {
        if self.variant == variant {
            return false;
        }
        tracing::debug!(
            from = %self.variant,
            to = %variant,
            generation = self.generation + 1,
            "variant changed; recreating instance"
        );
        self.instance = make(variant);
        self.variant = variant;
        self.generation += 1;
        true
    }

    #[inline]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// How many instances have been mounted in this slot.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn get(&self) -> &C {
        &self.instance
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut C {
        &mut self.instance
    }
}

impl<C: fmt::Debug> fmt::Debug for InstanceSlot<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceSlot")
            .field("variant", &self.variant)
            .field("generation", &self.generation)
            .field("instance", &self.instance)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{PassClock, RenderCounter};

    #[test]
    fn same_variant_keeps_instance() {
        let mut clock = PassClock::new();
        let mut slot = InstanceSlot::new(Variant::Plain, |_| RenderCounter::new());
        slot.get().record(clock.begin().pass());
        assert!(!slot.ensure(Variant::Plain, |_| RenderCounter::new()));
        assert_eq!(slot.get().get(), 1);
        assert_eq!(slot.generation(), 1);
    }

    #[test]
    fn variant_change_discards_counters() {
        let mut clock = PassClock::new();
        let mut slot = InstanceSlot::new(Variant::Plain, |_| RenderCounter::new());
        for _ in 0..4 {
            slot.get().record(clock.begin().pass());
        }
        assert!(slot.ensure(Variant::Memoized, |_| RenderCounter::new()));
        assert_eq!(slot.get().get(), 0);
        assert_eq!(slot.variant(), Variant::Memoized);
        assert_eq!(slot.generation(), 2);
    }

    #[test]
    fn variant_from_toggle() {
        assert_eq!(Variant::from_enabled(true), Variant::Memoized);
        assert!(!Variant::from_enabled(false).is_memoized());
        assert_eq!(Variant::Memoized.to_string(), "memoized");
    }
}
