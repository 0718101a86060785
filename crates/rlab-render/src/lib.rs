#![forbid(unsafe_code)]

//! Render kernel: cells, buffers, frames and the terminal presenter.
//!
//! `Model::view()` paints into a [`frame::Frame`]; the runtime hands the
//! finished buffer to [`presenter::Presenter`], which emits only the cells
//! that changed since the previous present.

pub mod buffer;
pub mod cell;
pub mod diff;
pub mod drawing;
pub mod frame;
pub mod presenter;
pub mod style;

/// Display width of a string in terminal cells.
#[inline]
pub fn display_width(text: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(text)
}
