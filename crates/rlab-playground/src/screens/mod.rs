#![forbid(unsafe_code)]

//! The overview and the playground screens.
//!
//! Each screen implements [`Screen`] and owns its reactive state. State is
//! created against the app's [`RenderScheduler`](rlab_runtime::hooks::RenderScheduler),
//! so a screen's `update` never renders directly; it sets state and the
//! runtime runs the render pass.

pub mod callback_playground;
pub mod computation_playground;
pub mod memo_playground;
pub mod overview;

use rlab_core::event::Event;
use rlab_core::geometry::Rect;
use rlab_render::frame::Frame;
use rlab_runtime::hooks::RenderCx;
use rlab_runtime::program::Cmd;

/// A key and what it does, for the stats column.
pub type KeyHint = (&'static str, &'static str);

/// A playground screen.
pub trait Screen {
    /// Screen-local message type, lifted into the app message by the app.
    type Message: 'static;

    /// Handle a terminal event that the app did not consume.
    fn update(&mut self, event: &Event) -> Cmd<Self::Message>;

    /// Handle a screen-local message.
    fn handle_message(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Run this screen's components for one render pass.
    fn render(&mut self, cx: &RenderCx);

    /// Paint the latest rendered state into `area`.
    fn view(&self, frame: &mut Frame, area: Rect);

    /// Advance paint-only animations. Called on every runtime tick.
    fn tick(&self) {}

    /// Whether typed characters belong to the screen (e.g. a text field).
    fn captures_text(&self) -> bool {
        false
    }

    /// Screen-specific key bindings.
    fn keybindings(&self) -> &'static [KeyHint];
}

/// The key event if `event` is an actionable key press.
pub(crate) fn key_press(event: &Event) -> Option<rlab_core::event::KeyEvent> {
    match event {
        Event::Key(key) if key.is_actionable() => Some(*key),
        _ => None,
    }
}
