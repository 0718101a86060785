#![forbid(unsafe_code)]

//! Diff computation between buffers.
//!
//! Row-major scan comparing `old[x, y]` with `new[x, y]`; adjacent changes on
//! a row coalesce into [`ChangeRun`]s so the presenter positions the cursor
//! once per run.

use crate::buffer::Buffer;

/// A contiguous run of changed cells on a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRun {
    /// Row index.
    pub y: u16,
    /// Start column (inclusive).
    pub x0: u16,
    /// End column (inclusive).
    pub x1: u16,
}

/// The diff between two buffers.
#[derive(Debug, Clone, Default)]
pub struct BufferDiff {
    changes: Vec<(u16, u16)>,
}

impl BufferDiff {
    /// Compute the diff between two buffers of the same size.
    ///
    /// Buffers of different sizes produce a full diff of `new`.
    pub fn compute(old: &Buffer, new: &Buffer) -> Self {
        if old.width() != new.width() || old.height() != new.height() {
            return Self::full(new);
        }
        let mut changes = Vec::new();
        for y in 0..new.height() {
            for x in 0..new.width() {
                if old.get(x, y) != new.get(x, y) {
                    changes.push((x, y));
                }
            }
        }
        Self { changes }
    }

    /// A diff covering every cell of `buffer`.
    pub fn full(buffer: &Buffer) -> Self {
        let mut changes =
            Vec::with_capacity(usize::from(buffer.width()) * usize::from(buffer.height()));
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                changes.push((x, y));
            }
        }
        Self { changes }
    }

    /// Number of changed cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Whether nothing changed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Coalesce changes into per-row runs.
    pub fn runs(&self) -> Vec<ChangeRun> {
        let mut runs: Vec<ChangeRun> = Vec::new();
        for &(x, y) in &self.changes {
            match runs.last_mut() {
                Some(run) if run.y == y && run.x1 + 1 == x => run.x1 = x,
                _ => runs.push(ChangeRun { y, x0: x, x1: x }),
            }
        }
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    #[test]
    fn identical_buffers_have_empty_diff() {
        let a = Buffer::new(5, 5);
        assert!(BufferDiff::compute(&a, &a.clone()).is_empty());
    }

    #[test]
    fn adjacent_changes_form_one_run() {
        let old = Buffer::new(10, 3);
        let mut new = old.clone();
        new.set(2, 1, Cell::from_char('a'));
        new.set(3, 1, Cell::from_char('b'));
        new.set(7, 1, Cell::from_char('c'));
        new.set(0, 2, Cell::from_char('d'));
        let diff = BufferDiff::compute(&old, &new);
        assert_eq!(diff.len(), 4);
        assert_eq!(
            diff.runs(),
            vec![
                ChangeRun { y: 1, x0: 2, x1: 3 },
                ChangeRun { y: 1, x0: 7, x1: 7 },
                ChangeRun { y: 2, x0: 0, x1: 0 },
            ]
        );
    }

    #[test]
    fn size_mismatch_is_full_diff() {
        let old = Buffer::new(2, 2);
        let new = Buffer::new(3, 2);
        assert_eq!(BufferDiff::compute(&old, &new).len(), 6);
        assert_eq!(BufferDiff::full(&new).runs().len(), 2);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn applying_diff_reproduces_new(
                writes in proptest::collection::vec((0u16..12, 0u16..4, proptest::char::range('a', 'z')), 0..40),
            ) {
                let old = Buffer::new(12, 4);
                let mut new = old.clone();
                for &(x, y, c) in &writes {
                    new.set(x, y, Cell::from_char(c));
                }
                let diff = BufferDiff::compute(&old, &new);
                let mut patched = old.clone();
                for run in diff.runs() {
                    for x in run.x0..=run.x1 {
                        if let Some(cell) = new.get(x, run.y) {
                            *patched.get_mut(x, run.y).expect("in bounds") = *cell;
                        }
                    }
                }
                prop_assert!(patched.content_eq(&new));
            }
        }
    }
}
