#![forbid(unsafe_code)]

//! Drawing primitives on top of [`Buffer`].

use rlab_core::geometry::Rect;
use unicode_width::UnicodeWidthChar;

use crate::buffer::Buffer;
use crate::cell::Cell;
use crate::style::Style;

/// Characters used to draw a border around a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BorderChars {
    /// Simple box-drawing characters (U+250x).
    pub const SQUARE: Self = Self {
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
        horizontal: '─',
        vertical: '│',
    };

    /// Rounded corners.
    pub const ROUNDED: Self = Self {
        top_left: '╭',
        top_right: '╮',
        bottom_left: '╰',
        bottom_right: '╯',
        horizontal: '─',
        vertical: '│',
    };

    /// Heavy border, used to highlight the panel that just re-rendered.
    pub const HEAVY: Self = Self {
        top_left: '┏',
        top_right: '┓',
        bottom_left: '┗',
        bottom_right: '┛',
        horizontal: '━',
        vertical: '┃',
    };
}

/// Extension trait for drawing on a Buffer.
pub trait Draw {
    /// Print styled text starting at (x, y), stopping before `max_x`.
    ///
    /// Unset style channels keep the colors already in the buffer. Wide
    /// characters that would straddle `max_x` are dropped. Returns the x
    /// position after the last character written.
    fn print_text_clipped(&mut self, x: u16, y: u16, text: &str, style: Style, max_x: u16) -> u16;

    /// Print styled text up to the buffer edge.
    fn print_text(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16;

    /// Draw a border inside `rect` with an optional title on the top edge.
    fn draw_border(&mut self, rect: Rect, chars: BorderChars, style: Style, title: Option<&str>);

    /// Restyle every cell in `rect` without touching content.
    fn paint_area(&mut self, rect: Rect, style: Style);
}

impl Draw for Buffer {
    fn print_text_clipped(&mut self, x: u16, y: u16, text: &str, style: Style, max_x: u16) -> u16 {
        let max_x = max_x.min(self.width());
        let mut cx = x;
        for c in text.chars() {
            let width = UnicodeWidthChar::width(c).unwrap_or(0) as u16;
            if width == 0 {
                continue;
            }
            if cx.saturating_add(width) > max_x {
                break;
            }
            let base = self.get(cx, y).copied().unwrap_or_default();
            self.set(cx, y, style.apply(base.with_char(c)));
            cx += width;
        }
        cx
    }

    fn print_text(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        let max_x = self.width();
        self.print_text_clipped(x, y, text, style, max_x)
    }

    fn draw_border(&mut self, rect: Rect, chars: BorderChars, style: Style, title: Option<&str>) {
        if rect.width < 2 || rect.height < 2 {
            return;
        }
        let right = rect.right() - 1;
        let bottom = rect.bottom() - 1;
        let put = |buf: &mut Buffer, x: u16, y: u16, c: char| {
            let base = buf.get(x, y).copied().unwrap_or_default();
            buf.set(x, y, style.apply(base.with_char(c)));
        };
        for x in rect.x + 1..right {
            put(self, x, rect.y, chars.horizontal);
            put(self, x, bottom, chars.horizontal);
        }
        for y in rect.y + 1..bottom {
            put(self, rect.x, y, chars.vertical);
            put(self, right, y, chars.vertical);
        }
        put(self, rect.x, rect.y, chars.top_left);
        put(self, right, rect.y, chars.top_right);
        put(self, rect.x, bottom, chars.bottom_left);
        put(self, right, bottom, chars.bottom_right);

        if let Some(title) = title.filter(|_| rect.width > 4) {
            let text = format!(" {title} ");
            self.print_text_clipped(rect.x + 1, rect.y, &text, style, right);
        }
    }

    fn paint_area(&mut self, rect: Rect, style: Style) {
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                if let Some(cell) = self.get_mut(x, y) {
                    *cell = style.apply(*cell);
                }
            }
        }
    }
}

/// Fill `rect` with blank cells carrying `style`.
pub fn clear_area(buf: &mut Buffer, rect: Rect, style: Style) {
    buf.fill(rect, style.apply(Cell::default()));
}
