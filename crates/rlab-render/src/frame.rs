#![forbid(unsafe_code)]

//! Frame: the paint target handed to `Model::view()`.

use rlab_core::geometry::Rect;

use crate::buffer::Buffer;

/// A frame being painted.
///
/// Wraps a [`Buffer`] plus the cursor request a view may make (the filter
/// input shows a caret while editing).
#[derive(Debug, Clone)]
pub struct Frame {
    /// The cell grid.
    pub buffer: Buffer,
    cursor: Option<(u16, u16)>,
}

impl Frame {
    /// Create a blank frame.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::new(width, height),
            cursor: None,
        }
    }

    /// The full frame area.
    #[inline]
    pub fn area(&self) -> Rect {
        self.buffer.bounds()
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.buffer.width()
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.buffer.height()
    }

    /// Request a visible cursor at (x, y) after presenting.
    pub fn set_cursor(&mut self, position: Option<(u16, u16)>) {
        self.cursor = position;
    }

    /// The requested cursor position, if any.
    #[inline]
    pub fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor
    }

    /// Consume the frame, keeping its buffer.
    pub fn into_buffer(self) -> Buffer {
        self.buffer
    }
}
