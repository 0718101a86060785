#![forbid(unsafe_code)]

//! Geometric primitives.

/// A rectangle for layout bounds.
///
/// Uses terminal coordinates (0-indexed, origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: u16,
    /// Top edge (inclusive).
    pub y: u16,
    /// Width in cells.
    pub width: u16,
    /// Height in cells.
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Create a new rectangle inside the current one with the given margin.
    pub fn inner(&self, margin: Sides) -> Rect {
        let x = self.x.saturating_add(margin.left);
        let y = self.y.saturating_add(margin.top);
        let width = self
            .width
            .saturating_sub(margin.left)
            .saturating_sub(margin.right);
        let height = self
            .height
            .saturating_sub(margin.top)
            .saturating_sub(margin.bottom);

        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Split off `rows` rows from the top, returning `(top, rest)`.
    ///
    /// Clamps to the available height.
    pub fn split_top(&self, rows: u16) -> (Rect, Rect) {
        let rows = rows.min(self.height);
        (
            Rect::new(self.x, self.y, self.width, rows),
            Rect::new(self.x, self.y + rows, self.width, self.height - rows),
        )
    }

    /// Split off `rows` rows from the bottom, returning `(rest, bottom)`.
    pub fn split_bottom(&self, rows: u16) -> (Rect, Rect) {
        let rows = rows.min(self.height);
        let rest = self.height - rows;
        (
            Rect::new(self.x, self.y, self.width, rest),
            Rect::new(self.x, self.y + rest, self.width, rows),
        )
    }

    /// Split horizontally into columns proportional to `weights`.
    ///
    /// Widths are floored; the remainder goes to the last column so the
    /// columns always tile the rectangle exactly.
    pub fn split_columns(&self, weights: &[u16]) -> Vec<Rect> {
        let total: u32 = weights.iter().map(|&w| u32::from(w)).sum();
        if weights.is_empty() || total == 0 {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(weights.len());
        let mut x = self.x;
        for (i, &weight) in weights.iter().enumerate() {
            let width = if i + 1 == weights.len() {
                self.right().saturating_sub(x)
            } else {
                (u32::from(self.width) * u32::from(weight) / total) as u16
            };
            out.push(Rect::new(x, self.y, width, self.height));
            x = x.saturating_add(width);
        }
        out
    }
}

/// Sides for padding/margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sides {
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub left: u16,
}

impl Sides {
    /// Create new sides with equal values.
    pub const fn all(val: u16) -> Self {
        Self {
            top: val,
            right: val,
            bottom: val,
            left: val,
        }
    }

    /// Create new sides with horizontal values only.
    pub const fn horizontal(val: u16) -> Self {
        Self {
            top: 0,
            right: val,
            bottom: 0,
            left: val,
        }
    }
}

impl From<u16> for Sides {
    fn from(val: u16) -> Self {
        Self::all(val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_saturates() {
        let r = Rect::new(0, 0, 2, 2);
        assert!(r.inner(Sides::all(3)).is_empty());
        assert_eq!(
            Rect::new(1, 1, 10, 6).inner(Sides::all(1)),
            Rect::new(2, 2, 8, 4)
        );
    }

    #[test]
    fn split_top_and_bottom() {
        let r = Rect::new(0, 0, 80, 24);
        let (top, rest) = r.split_top(1);
        assert_eq!(top, Rect::new(0, 0, 80, 1));
        assert_eq!(rest, Rect::new(0, 1, 80, 23));
        let (body, status) = rest.split_bottom(1);
        assert_eq!(body.height, 22);
        assert_eq!(status, Rect::new(0, 23, 80, 1));
    }

    #[test]
    fn split_columns_tiles_exactly() {
        let r = Rect::new(3, 0, 101, 10);
        let cols = r.split_columns(&[2, 2, 1]);
        assert_eq!(cols.len(), 3);
        assert_eq!(cols[0].x, 3);
        assert_eq!(cols[1].x, cols[0].right());
        assert_eq!(cols[2].x, cols[1].right());
        assert_eq!(cols[2].right(), r.right());
    }

    #[test]
    fn split_columns_empty_weights() {
        assert!(Rect::new(0, 0, 10, 10).split_columns(&[]).is_empty());
        assert!(Rect::new(0, 0, 10, 10).split_columns(&[0, 0]).is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn columns_tile_any_rect(
                x in 0u16..100,
                width in 0u16..400,
                weights in proptest::collection::vec(1u16..10, 1..6),
            ) {
                let r = Rect::new(x, 0, width, 5);
                let cols = r.split_columns(&weights);
                prop_assert_eq!(cols.len(), weights.len());
                let total: u32 = cols.iter().map(|c| u32::from(c.width)).sum();
                prop_assert_eq!(total, u32::from(width));
                for pair in cols.windows(2) {
                    prop_assert_eq!(pair[0].right(), pair[1].x);
                }
            }
        }
    }
}
