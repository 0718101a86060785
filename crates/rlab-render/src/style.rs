#![forbid(unsafe_code)]

//! Text styles.
//!
//! A [`Style`] is a partial cell template: unset colors leave whatever the
//! buffer already holds, so a styled label drawn over a panel keeps the
//! panel's background.

use crate::cell::{Cell, PackedRgba, StyleFlags};

/// Foreground, background and attribute overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<PackedRgba>,
    pub bg: Option<PackedRgba>,
    pub attrs: StyleFlags,
}

impl Style {
    /// An empty style that changes nothing.
    #[inline]
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            attrs: StyleFlags::empty(),
        }
    }

    /// Set the foreground color.
    #[inline]
    pub const fn fg(mut self, fg: PackedRgba) -> Self {
        self.fg = Some(fg);
        self
    }

    /// Set the background color.
    #[inline]
    pub const fn bg(mut self, bg: PackedRgba) -> Self {
        self.bg = Some(bg);
        self
    }

    /// Add style attributes.
    #[inline]
    pub const fn attrs(mut self, attrs: StyleFlags) -> Self {
        self.attrs = self.attrs.union(attrs);
        self
    }

    /// Layer `other` on top of `self`.
    #[must_use]
    pub fn patch(self, other: Style) -> Style {
        Style {
            fg: other.fg.or(self.fg),
            bg: other.bg.or(self.bg),
            attrs: self.attrs | other.attrs,
        }
    }

    /// Apply this style to an existing cell.
    #[must_use]
    pub fn apply(self, mut cell: Cell) -> Cell {
        if let Some(fg) = self.fg {
            cell.fg = fg;
        }
        if let Some(bg) = self.bg {
            cell.bg = bg;
        }
        cell.flags |= self.attrs;
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_prefers_overlay() {
        let base = Style::new().fg(PackedRgba::WHITE).bg(PackedRgba::BLACK);
        let overlay = Style::new().fg(PackedRgba::rgb(1, 2, 3)).attrs(StyleFlags::BOLD);
        let merged = base.patch(overlay);
        assert_eq!(merged.fg, Some(PackedRgba::rgb(1, 2, 3)));
        assert_eq!(merged.bg, Some(PackedRgba::BLACK));
        assert!(merged.attrs.contains(StyleFlags::BOLD));
    }

    #[test]
    fn apply_keeps_unset_channels() {
        let cell = Cell::from_char('a').with_bg(PackedRgba::BLACK);
        let styled = Style::new().fg(PackedRgba::WHITE).apply(cell);
        assert_eq!(styled.bg, PackedRgba::BLACK);
        assert_eq!(styled.fg, PackedRgba::WHITE);
        assert_eq!(styled.content.as_char(), Some('a'));
    }
}
