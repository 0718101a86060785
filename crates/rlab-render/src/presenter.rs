#![forbid(unsafe_code)]

//! Presenter: state-tracked terminal emission.
//!
//! Turns a [`BufferDiff`] into crossterm commands. The current style and
//! cursor position are tracked so repeated cells with the same style emit
//! only their characters, and each change run costs one cursor move.
//!
//! ```ignore
//! let mut presenter = Presenter::new(std::io::stdout());
//! let diff = BufferDiff::compute(&previous, &next);
//! presenter.present(&next, &diff)?;
//! ```

use std::io::{self, BufWriter, Write};

use crossterm::QueueableCommand;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate};

use crate::buffer::Buffer;
use crate::cell::{Cell, CellContent, PackedRgba, StyleFlags};
use crate::diff::BufferDiff;

const BUFFER_CAPACITY: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellStyle {
    fg: PackedRgba,
    bg: PackedRgba,
    flags: StyleFlags,
}

impl CellStyle {
    fn from_cell(cell: &Cell) -> Self {
        Self {
            fg: cell.fg,
            bg: cell.bg,
            flags: cell.flags,
        }
    }
}

/// State-tracked presenter over any writer.
pub struct Presenter<W: Write> {
    writer: BufWriter<W>,
    current_style: Option<CellStyle>,
    cursor: Option<(u16, u16)>,
}

impl<W: Write> Presenter<W> {
    /// Create a presenter writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(BUFFER_CAPACITY, writer),
            current_style: None,
            cursor: None,
        }
    }

    /// Emit the cells listed in `diff`, then flush.
    ///
    /// Output is wrapped in a synchronized update so terminals that support
    /// it swap the frame atomically.
    pub fn present(&mut self, buffer: &Buffer, diff: &BufferDiff) -> io::Result<()> {
        if diff.is_empty() {
            return Ok(());
        }
        rlab_core::trace!(changes = diff.len(), "presenting frame");
        self.writer.queue(BeginSynchronizedUpdate)?;
        for run in diff.runs() {
            self.move_cursor_to(run.x0, run.y)?;
            for x in run.x0..=run.x1 {
                if let Some(cell) = buffer.get(x, run.y) {
                    self.emit_cell(cell)?;
                }
            }
        }
        self.writer.queue(SetAttribute(Attribute::Reset))?;
        self.current_style = None;
        self.writer.queue(EndSynchronizedUpdate)?;
        self.writer.flush()
    }

    /// Clear the screen and forget tracked state.
    pub fn clear_screen(&mut self) -> io::Result<()> {
        self.writer.queue(Clear(ClearType::All))?;
        self.writer.queue(MoveTo(0, 0))?;
        self.cursor = Some((0, 0));
        self.current_style = None;
        self.writer.flush()
    }

    /// Show the terminal cursor at `position`, or hide it.
    pub fn set_cursor(&mut self, position: Option<(u16, u16)>) -> io::Result<()> {
        match position {
            Some((x, y)) => {
                self.writer.queue(MoveTo(x, y))?;
                self.writer.queue(Show)?;
                self.cursor = Some((x, y));
            }
            None => {
                self.writer.queue(Hide)?;
            }
        }
        self.writer.flush()
    }

    /// Forget tracked cursor and style, e.g. after a resize.
    pub fn reset(&mut self) {
        self.cursor = None;
        self.current_style = None;
    }

    /// Consume the presenter and return the inner writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|err| err.into_error())
    }

    fn emit_cell(&mut self, cell: &Cell) -> io::Result<()> {
        if cell.is_continuation() {
            return Ok(());
        }
        self.emit_style_changes(cell)?;
        match cell.content {
            CellContent::Char(c) => self.writer.queue(Print(c))?,
            _ => self.writer.queue(Print(' '))?,
        };
        if let Some((x, y)) = self.cursor {
            let advance = cell.content.width().max(1) as u16;
            self.cursor = Some((x.saturating_add(advance), y));
        }
        Ok(())
    }

    fn emit_style_changes(&mut self, cell: &Cell) -> io::Result<()> {
        let style = CellStyle::from_cell(cell);
        if self.current_style == Some(style) {
            return Ok(());
        }
        self.writer.queue(SetAttribute(Attribute::Reset))?;
        if !style.fg.is_transparent() {
            self.writer.queue(SetForegroundColor(to_color(style.fg)))?;
        }
        if !style.bg.is_transparent() {
            self.writer.queue(SetBackgroundColor(to_color(style.bg)))?;
        }
        for (flag, attr) in [
            (StyleFlags::BOLD, Attribute::Bold),
            (StyleFlags::DIM, Attribute::Dim),
            (StyleFlags::ITALIC, Attribute::Italic),
            (StyleFlags::UNDERLINE, Attribute::Underlined),
            (StyleFlags::REVERSE, Attribute::Reverse),
        ] {
            if style.flags.contains(flag) {
                self.writer.queue(SetAttribute(attr))?;
            }
        }
        self.current_style = Some(style);
        Ok(())
    }

    fn move_cursor_to(&mut self, x: u16, y: u16) -> io::Result<()> {
        if self.cursor == Some((x, y)) {
            return Ok(());
        }
        self.writer.queue(MoveTo(x, y))?;
        self.cursor = Some((x, y));
        Ok(())
    }
}

fn to_color(color: PackedRgba) -> Color {
    Color::Rgb {
        r: color.r(),
        g: color.g(),
        b: color.b(),
    }
}
