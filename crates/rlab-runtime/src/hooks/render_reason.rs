#![forbid(unsafe_code)]

//! Render-reason classification for a child component.

use super::prop::Prop;

/// Why a child rendered (or did not) in the latest pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderReason {
    /// No previous value to compare against.
    #[default]
    FirstRender,
    /// Memoized and the tracked prop differs.
    PropsChanged,
    /// Memoized, prop unchanged, parent rendered: the child was skipped.
    SkippedByMemo,
    /// Not memoized and the parent rendered.
    ParentRendered,
    /// Nothing upstream rendered.
    Idle,
}

impl RenderReason {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PropsChanged => "Rendered: Props changed",
            Self::SkippedByMemo => "Skipped: Props unchanged (memo)",
            Self::ParentRendered => "Rendered: Parent re-rendered",
            Self::FirstRender | Self::Idle => "",
        }
    }

    /// Whether the child's render body runs.
    #[must_use]
    pub const fn would_render(self) -> bool {
        matches!(
            self,
            Self::FirstRender | Self::PropsChanged | Self::ParentRendered
        )
    }
}

/// Classify a child's render.
///
/// `previous` must be the value observed during the *previous* pass (see
/// [`PropSnapshot::observe`]); `None` means this is the first render.
pub fn classify<P: Prop>(
    previous: Option<&P>,
    current: &P,
    parent_rendered: bool,
    memo: bool,
) -> RenderReason {
    let Some(previous) = previous else {
        return RenderReason::FirstRender;
    };
    if !memo {
        return if parent_rendered {
            RenderReason::ParentRendered
        } else {
            RenderReason::Idle
        };
    }
    if !previous.prop_eq(current) {
        RenderReason::PropsChanged
    } else if parent_rendered {
        RenderReason::SkippedByMemo
    } else {
        RenderReason::Idle
    }
}

/// The tracked prop's value from the previous pass.
#[derive(Debug)]
pub struct PropSnapshot<P> {
    previous: Option<P>,
}

impl<P> Default for PropSnapshot<P> {
    fn default() -> Self {
        Self { previous: None }
    }
}

impl<P: Prop + Clone> PropSnapshot<P> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `current` for the next pass and hand back the previous value.
    ///
    /// Call once per pass; the returned value stays alive for the comparison,
    /// so a replaced callback cannot have its allocation reused mid-compare.
    pub fn observe(&mut self, current: &P) -> Option<P> {
        self.previous.replace(current.clone())
    }

    /// Observe `current` and classify against the previous pass.
    pub fn classify(&mut self, current: &P, parent_rendered: bool, memo: bool) -> RenderReason {
        let previous = self.observe(current);
        classify(previous.as_ref(), current, parent_rendered, memo)
    }

    /// Value recorded by the latest pass.
    #[must_use]
    pub fn latest(&self) -> Option<&P> {
        self.previous.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::prop::Callback;

    #[test]
    fn classifier_table() {
        use RenderReason::*;
        let cases: &[(Option<u64>, u64, bool, bool, RenderReason)] = &[
            (None, 1, true, true, FirstRender),
            (None, 1, true, false, FirstRender),
            (Some(1), 1, true, false, ParentRendered),
            (Some(1), 2, true, false, ParentRendered),
            (Some(1), 1, false, false, Idle),
            (Some(1), 2, true, true, PropsChanged),
            (Some(1), 2, false, true, PropsChanged),
            (Some(1), 1, true, true, SkippedByMemo),
            (Some(1), 1, false, true, Idle),
        ];
        for &(prev, cur, parent, memo, expected) in cases {
            assert_eq!(
                classify(prev.as_ref(), &cur, parent, memo),
                expected,
                "prev={prev:?} cur={cur} parent={parent} memo={memo}"
            );
        }
    }

    #[test]
    fn labels() {
        assert_eq!(RenderReason::FirstRender.label(), "");
        assert_eq!(RenderReason::PropsChanged.label(), "Rendered: Props changed");
        assert_eq!(
            RenderReason::SkippedByMemo.label(),
            "Skipped: Props unchanged (memo)"
        );
        assert_eq!(
            RenderReason::ParentRendered.label(),
            "Rendered: Parent re-rendered"
        );
        assert!(!RenderReason::SkippedByMemo.would_render());
        assert!(!RenderReason::Idle.would_render());
        assert!(RenderReason::FirstRender.would_render());
    }

    #[test]
    fn snapshot_compares_against_previous_pass() {
        let mut snap = PropSnapshot::new();
        assert_eq!(snap.classify(&1u64, true, true), RenderReason::FirstRender);
        assert_eq!(snap.classify(&1u64, true, true), RenderReason::SkippedByMemo);
        assert_eq!(snap.classify(&2u64, true, true), RenderReason::PropsChanged);
        assert_eq!(snap.latest(), Some(&2));
    }

    #[test]
    fn fresh_callbacks_defeat_memo() {
        let mut snap = PropSnapshot::new();
        snap.classify(&Callback::new(|| ()), true, true);
        assert_eq!(
            snap.classify(&Callback::new(|| ()), true, true),
            RenderReason::PropsChanged
        );

        let stable = Callback::new(|| ());
        snap.classify(&stable, true, true);
        assert_eq!(
            snap.classify(&stable, true, true),
            RenderReason::SkippedByMemo
        );
    }
}
