#![forbid(unsafe_code)]

//! The cell grid a frame is painted into.
//!
//! Row-major, `index = y * width + x`, and always exactly `width * height`
//! cells. Writes outside the grid are dropped rather than reported.

use rlab_core::geometry::Rect;

use crate::cell::Cell;

/// A 2D grid of terminal cells.
///
/// ```
/// use rlab_render::buffer::Buffer;
/// use rlab_render::cell::Cell;
///
/// let mut buffer = Buffer::new(80, 24);
/// buffer.set(0, 0, Cell::from_char('H'));
/// buffer.set(1, 0, Cell::from_char('i'));
/// ```
#[derive(Debug, Clone)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    /// Create a new buffer of empty cells.
    ///
    /// Zero dimensions are clamped to one so the grid is never empty.
    pub fn new(width: u16, height: u16) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![Cell::default(); usize::from(width) * usize::from(height)],
        }
    }

    /// Buffer width in cells.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Buffer height in cells.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Bounding rect of the entire buffer.
    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// Get a reference to the cell at (x, y).
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|idx| &self.cells[idx])
    }

    /// Get a mutable reference to the cell at (x, y).
    #[inline]
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index(x, y).map(|idx| &mut self.cells[idx])
    }

    /// Set the cell at (x, y).
    ///
    /// A wide character is written whole (head plus continuation cells) or
    /// not at all when its tail would fall off the right edge.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let width = cell.content.width().max(1) as u16;
        if self.index(x.saturating_add(width - 1), y).is_none() {
            return;
        }
        self.clear_wide_overlap(x, y);
        if let Some(idx) = self.index(x, y) {
            self.cells[idx] = cell;
        }
        for dx in 1..width {
            self.clear_wide_overlap(x + dx, y);
            if let Some(idx) = self.index(x + dx, y) {
                self.cells[idx] = Cell::CONTINUATION;
            }
        }
    }

    /// Overwriting half of a wide character blanks the other half.
    fn clear_wide_overlap(&mut self, x: u16, y: u16) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        if self.cells[idx].is_continuation() {
            let mut cx = x;
            while cx > 0 {
                cx -= 1;
                if let Some(head) = self.index(cx, y) {
                    let is_cont = self.cells[head].is_continuation();
                    self.cells[head] = Cell::default();
                    if !is_cont {
                        break;
                    }
                }
            }
        } else if self.cells[idx].content.width() > 1 {
            let mut cx = x + 1;
            while let Some(tail) = self.index(cx, y) {
                if !self.cells[tail].is_continuation() {
                    break;
                }
                self.cells[tail] = Cell::default();
                cx += 1;
            }
        }
    }

    /// Fill `rect`, clipped to the grid.
    pub fn fill(&mut self, rect: Rect, cell: Cell) {
        let clipped = intersect(self.bounds(), rect);
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                self.set(x, y, cell);
            }
        }
    }

    /// Clear all cells to the default.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Raw access to the cell slice.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Whether two buffers hold identical cells.
    pub fn content_eq(&self, other: &Buffer) -> bool {
        self.width == other.width && self.height == other.height && self.cells == other.cells
    }

    /// Plain-text rendering of row `y`, continuation cells skipped.
    pub fn row_text(&self, y: u16) -> String {
        let mut out = String::with_capacity(usize::from(self.width));
        for x in 0..self.width {
            let Some(cell) = self.get(x, y) else { break };
            match cell.content {
                crate::cell::CellContent::Char(c) => out.push(c),
                crate::cell::CellContent::Empty => out.push(' '),
                crate::cell::CellContent::Continuation => {}
            }
        }
        out
    }

    /// Plain-text rendering of the whole buffer, one line per row, trailing
    /// spaces trimmed.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::with_capacity(usize::from(self.height));
        for y in 0..self.height {
            lines.push(self.row_text(y).trim_end().to_string());
        }
        lines.join("\n")
    }
}

fn intersect(a: Rect, b: Rect) -> Rect {
    let x = a.x.max(b.x);
    let y = a.y.max(b.y);
    let right = a.right().min(b.right());
    let bottom = a.bottom().min(b.bottom());
    if right <= x || bottom <= y {
        return Rect::new(x, y, 0, 0);
    }
    Rect::new(x, y, right - x, bottom - y)
}
