#![forbid(unsafe_code)]

//! Component memoization playground.
//!
//! A parent with a counter renders a child that takes one value prop. With
//! memoization off the child renders on every parent render; with it on the
//! child only renders when its prop changes. Toggling swaps the child's
//! identity, so its counters start over.

use std::convert::Infallible;

use rlab_core::event::{Event, KeyCode};
use rlab_core::geometry::Rect;
use rlab_render::drawing::Draw;
use rlab_render::frame::Frame;
use rlab_render::style::Style;
use rlab_runtime::hooks::{
    InstanceSlot, PropSnapshot, RenderCounter, RenderCx, RenderFlash, RenderReason,
    RenderScheduler, State, Variant,
};
use rlab_runtime::program::Cmd;

use super::{KeyHint, Screen, key_press};
use crate::chrome::{self, CodeSample, Notes, StatRow};
use crate::theme;

const PLAIN_CODE: CodeSample = CodeSample::new(
    "\
// Plain child: renders on every parent render.
fn render(&mut self, cx: &RenderCx) {
    self.renders.record(cx.pass());
    let value = self.child_value.value();
    self.child.get_mut().render(cx, value, false);
}

impl Child {
    fn render(&mut self, cx: &RenderCx, value: u64, memo: bool) {
        self.reason = self.snapshot
            .classify(&value, true, memo);
        if self.reason.would_render() {
            self.renders.record(cx.pass());
            self.value = value;
        }
    }
}",
    None,
);

const MEMO_CODE: CodeSample = CodeSample::new(
    "\
// Memoized child: skips when its prop is equal.
fn render(&mut self, cx: &RenderCx) {
    self.renders.record(cx.pass());
    let value = self.child_value.value();
    self.child.get_mut().render(cx, value, true);
}

impl Child {
    fn render(&mut self, cx: &RenderCx, value: u64, memo: bool) {
        self.reason = self.snapshot
            .classify(&value, true, memo);
        if self.reason.would_render() {
            self.renders.record(cx.pass());
            self.value = value;
        }
    }
}",
    Some((10, 12)),
);

const HOW_TO_TEST: &[&str] = &[
    "Press + and see whether the child renders.",
    "Press c: a new prop always renders the child.",
    "Toggle memo with m and compare.",
];

const WHERE_MEMO_FAILS: (&str, &str) = (
    "Where memo fails (function props)",
    "A handler built inline is a new value on every render, so a memoized \
     child sees changed props every time. Press 2 for the stable callback playground.",
);

const PLAIN_NOTES: Notes = Notes {
    how_to_test: HOW_TO_TEST,
    behavior: "No memo: the child renders on every parent render, even when its \
               prop did not change.",
    caveat: Some(WHERE_MEMO_FAILS),
};

const MEMO_NOTES: Notes = Notes {
    how_to_test: HOW_TO_TEST,
    behavior: "Memo compares the prop first. A parent-only render leaves the \
               child's count alone and labels it skipped.",
    caveat: Some(WHERE_MEMO_FAILS),
};

const KEYS: &[KeyHint] = &[
    ("+", "increment parent count"),
    ("c", "change child prop"),
    ("m", "toggle memo"),
];

/// The child component.
#[derive(Debug, Default)]
pub struct Child {
    renders: RenderCounter,
    flash: RenderFlash,
    snapshot: PropSnapshot<u64>,
    reason: RenderReason,
    value: u64,
}

impl Child {
    fn new(_variant: Variant) -> Self {
        Self::default()
    }

    fn render(&mut self, cx: &RenderCx, value: u64, memo: bool) {
        self.reason = self.snapshot.classify(&value, true, memo);
        if self.reason.would_render() {
            self.renders.record(cx.pass());
            self.value = value;
        }
        self.flash.observe(self.renders.get());
    }
}

/// Memoization playground state.
#[derive(Debug)]
pub struct MemoPlayground {
    parent_count: State<u64>,
    child_value: State<u64>,
    memo_enabled: State<bool>,
    renders: RenderCounter,
    flash: RenderFlash,
    child: InstanceSlot<Child>,
}

impl MemoPlayground {
    pub fn new(scheduler: &RenderScheduler) -> Self {
        Self {
            parent_count: State::new(0, scheduler),
            child_value: State::new(0, scheduler),
            memo_enabled: State::new(false, scheduler),
            renders: RenderCounter::new(),
            flash: RenderFlash::new(),
            child: InstanceSlot::new(Variant::Plain, Child::new),
        }
    }

    pub fn parent_renders(&self) -> u64 {
        self.renders.get()
    }

    pub fn child_renders(&self) -> u64 {
        self.child.get().renders.get()
    }

    pub fn child_reason(&self) -> RenderReason {
        self.child.get().reason
    }

    pub fn memo_enabled(&self) -> bool {
        self.memo_enabled.value()
    }

    pub fn parent_count(&self) -> u64 {
        self.parent_count.value()
    }

    /// Instances of the child mounted so far.
    pub fn child_generation(&self) -> u64 {
        self.child.generation()
    }

    pub fn child_flashing(&self) -> bool {
        self.child.get().flash.is_active()
    }
}

impl Screen for MemoPlayground {
    type Message = Infallible;

    fn update(&mut self, event: &Event) -> Cmd<Infallible> {
        let Some(key) = key_press(event) else {
            return Cmd::none();
        };
        match key.code {
            KeyCode::Char('+' | 'p') => {
                self.parent_count.update(|n| n + 1);
            }
            KeyCode::Char('c') => {
                self.child_value.update(|n| n + 1);
            }
            KeyCode::Char('m' | ' ') => {
                let on = self.memo_enabled.toggle();
                tracing::info!(memo = on, "memo toggled");
            }
            _ => {}
        }
        Cmd::none()
    }

    fn handle_message(&mut self, msg: Infallible) -> Cmd<Infallible> {
        match msg {}
    }

    fn render(&mut self, cx: &RenderCx) {
        self.renders.record(cx.pass());
        self.flash.observe(self.renders.get());

        let variant = Variant::from_enabled(self.memo_enabled.value());
        self.child.ensure(variant, Child::new);
        let value = self.child_value.value();
        self.child
            .get_mut()
            .render(cx, value, variant.is_memoized());
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let palette = theme::palette();
        let memo = self.memo_enabled.value();
        let shell = chrome::render_shell(
            frame,
            area,
            if memo { "Code: memo(Child)" } else { "Code: Child" },
        );
        chrome::render_code(frame, shell.code, if memo { &MEMO_CODE } else { &PLAIN_CODE });

        // Live: parent box with the child nested below its fields.
        let live = shell.live;
        let parent_inner = chrome::render_component_box(
            frame,
            Rect::new(live.x, live.y, live.width, live.height.min(11)),
            "Parent",
            self.flash.is_active(),
        );
        let text = Style::new().fg(palette.fg);
        let muted = Style::new().fg(palette.muted);
        let right = parent_inner.right();
        frame.buffer.print_text_clipped(
            parent_inner.x,
            parent_inner.y,
            &format!("count = {}", self.parent_count.get()),
            text,
            right,
        );
        frame.buffer.print_text_clipped(
            parent_inner.x,
            parent_inner.y + 1,
            &format!("renders: {}", self.renders.get()),
            muted,
            right,
        );

        let child = self.child.get();
        let child_rect = Rect::new(
            parent_inner.x,
            parent_inner.y + 3,
            parent_inner.width,
            parent_inner.height.saturating_sub(3).min(5),
        );
        let title = if memo { "memo(Child)" } else { "Child" };
        let child_inner =
            chrome::render_component_box(frame, child_rect, title, child.flash.is_active());
        let right = child_inner.right();
        frame.buffer.print_text_clipped(
            child_inner.x,
            child_inner.y,
            &format!("value = {}", child.value),
            text,
            right,
        );
        frame.buffer.print_text_clipped(
            child_inner.x,
            child_inner.y + 1,
            &format!("renders: {}", child.renders.get()),
            muted,
            right,
        );
        frame.buffer.print_text_clipped(
            child_inner.x,
            child_inner.y + 2,
            child.reason.label(),
            chrome::reason_style(child.reason),
            right,
        );

        let rows = [
            StatRow::new("parent renders", self.renders.get())
                .highlighted(self.flash.is_active()),
            StatRow::new("child renders", child.renders.get())
                .highlighted(child.flash.is_active()),
            StatRow::new("memo", if memo { "on" } else { "off" }),
            StatRow::new("child instance", self.child.generation()),
        ];
        let rest = chrome::render_stats(frame, shell.stats, &rows, self.keybindings());
        chrome::render_notes(frame, rest, if memo { &MEMO_NOTES } else { &PLAIN_NOTES });
    }

    fn tick(&self) {
        self.flash.tick();
        self.child.get().flash.tick();
    }

    fn keybindings(&self) -> &'static [KeyHint] {
        KEYS
    }
}
