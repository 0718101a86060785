#![forbid(unsafe_code)]

//! Stable callback playground.
//!
//! A parent passes its click count and an `on_click` handler to a memoized
//! button. Without a stable reference the handler is a fresh closure every
//! render, so the button's memo check always fails. With the stable gate the
//! same `Rc` is handed out and the button skips renders where only the
//! parent's own count moved. Toggling remounts the parent and everything in
//! it.

use rlab_core::event::{Event, KeyCode};
use rlab_core::geometry::Rect;
use rlab_render::drawing::Draw;
use rlab_render::frame::Frame;
use rlab_render::style::Style;
use rlab_runtime::hooks::{
    Callback, CallbackGate, CallbackMode, InstanceSlot, PropSnapshot, RenderCounter, RenderCx,
    RenderFlash, RenderReason, RenderScheduler, State, Variant,
};
use rlab_runtime::program::Cmd;

use super::{KeyHint, Screen, key_press};
use crate::chrome::{self, CodeSample, Notes, StatRow};
use crate::theme;

const UNSTABLE_CODE: CodeSample = CodeSample::new(
    "\
// CallbackMode::Unstable: resolve() wraps a
// new closure on every call, so the memoized
// button sees a different handler each pass.
fn render(&mut self, cx: &RenderCx) {
    let parent = self.parent.get_mut();
    parent.renders.record(cx.pass());
    let on_click = parent
        .gate
        .resolve(&(), || Msg::ChildClicked);
    let props = (self.clicks.value(), on_click);
    parent.button.render(cx, props);
}",
    None,
);

const STABLE_CODE: CodeSample = CodeSample::new(
    "\
// CallbackMode::Stable: resolve() hands back
// the same Rc while its deps (none) hold.
fn render(&mut self, cx: &RenderCx) {
    let parent = self.parent.get_mut();
    parent.renders.record(cx.pass());
    let on_click = parent
        .gate
        .resolve(&(), || Msg::ChildClicked);
    let props = (self.clicks.value(), on_click);
    parent.button.render(cx, props);
}",
    Some((6, 8)),
);

const HOW_TO_TEST: &[&str] = &[
    "Press + and watch the button's render count.",
    "Toggle the stable handler with m.",
    "Without it the memoized button still renders on every parent render.",
    "Click with Enter: a new click count always renders the button.",
];

const UNSTABLE_NOTES: Notes = Notes {
    how_to_test: HOW_TO_TEST,
    behavior: "Every parent render wraps a new closure. The button is memoized, \
               but its handler prop never compares equal, so it renders anyway.",
    caveat: None,
};

const STABLE_NOTES: Notes = Notes {
    how_to_test: HOW_TO_TEST,
    behavior: "The handler keeps its identity across renders. A parent-only \
               render leaves the button's props unchanged and memo skips it.",
    caveat: None,
};

const KEYS: &[KeyHint] = &[
    ("+", "increment parent count"),
    ("enter", "click the button"),
    ("m", "toggle stable handler"),
];

/// Messages produced by the button's handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    ChildClicked,
}

/// The button's props: the click count it shows and its handler.
type ButtonProps = (u64, Callback<Msg>);

/// The memoized button.
#[derive(Debug, Default)]
struct Button {
    renders: RenderCounter,
    flash: RenderFlash,
    snapshot: PropSnapshot<ButtonProps>,
    reason: RenderReason,
    clicks: u64,
    on_click: Option<Callback<Msg>>,
}

impl Button {
    fn render(&mut self, cx: &RenderCx, props: ButtonProps) {
        self.reason = self.snapshot.classify(&props, true, true);
        if self.reason.would_render() {
            self.renders.record(cx.pass());
            self.clicks = props.0;
        }
        self.on_click = Some(props.1);
        self.flash.observe(self.renders.get());
    }
}

/// One mount of the parent: its counter, handler gate and button.
#[derive(Debug)]
struct Parent {
    renders: RenderCounter,
    flash: RenderFlash,
    gate: CallbackGate<(), Msg>,
    button: Button,
}

impl Parent {
    fn new(variant: Variant) -> Self {
        Self {
            renders: RenderCounter::new(),
            flash: RenderFlash::new(),
            gate: CallbackGate::new(CallbackMode::from(variant)),
            button: Button::default(),
        }
    }
}

/// Stable callback playground state.
#[derive(Debug)]
pub struct CallbackPlayground {
    count: State<u64>,
    clicks: State<u64>,
    stable: State<bool>,
    parent: InstanceSlot<Parent>,
}

impl CallbackPlayground {
    pub fn new(scheduler: &RenderScheduler) -> Self {
        Self {
            count: State::new(0, scheduler),
            clicks: State::new(0, scheduler),
            stable: State::new(false, scheduler),
            parent: InstanceSlot::new(Variant::Plain, Parent::new),
        }
    }

    pub fn parent_renders(&self) -> u64 {
        self.parent.get().renders.get()
    }

    pub fn button_renders(&self) -> u64 {
        self.parent.get().button.renders.get()
    }

    pub fn button_reason(&self) -> RenderReason {
        self.parent.get().button.reason
    }

    /// Click count as last rendered by the button.
    pub fn button_clicks(&self) -> u64 {
        self.parent.get().button.clicks
    }

    pub fn stable(&self) -> bool {
        self.stable.value()
    }

    pub fn count(&self) -> u64 {
        self.count.value()
    }

    pub fn clicks(&self) -> u64 {
        self.clicks.value()
    }

    /// Handler closures allocated by the current gate.
    pub fn closures_created(&self) -> u64 {
        self.parent.get().gate.created()
    }

    /// The handler the button received in the latest pass.
    pub fn current_handler(&self) -> Option<Callback<Msg>> {
        self.parent.get().button.on_click.clone()
    }
}

impl Screen for CallbackPlayground {
    type Message = Msg;

    fn update(&mut self, event: &Event) -> Cmd<Msg> {
        let Some(key) = key_press(event) else {
            return Cmd::none();
        };
        match key.code {
            KeyCode::Char('+' | 'p') => {
                self.count.update(|n| n + 1);
            }
            KeyCode::Char('m' | ' ') => {
                let on = self.stable.toggle();
                // The parent remounts, so its state starts over too.
                self.count.set(0);
                self.clicks.set(0);
                tracing::info!(stable = on, "stable handler toggled");
            }
            KeyCode::Enter | KeyCode::Char('b') => {
                if let Some(on_click) = &self.parent.get().button.on_click {
                    return Cmd::msg(on_click.call());
                }
            }
            _ => {}
        }
        Cmd::none()
    }

    fn handle_message(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::ChildClicked => {
                self.clicks.update(|n| n + 1);
            }
        }
        Cmd::none()
    }

    fn render(&mut self, cx: &RenderCx) {
        let variant = Variant::from_enabled(self.stable.value());
        self.parent.ensure(variant, Parent::new);
        let parent = self.parent.get_mut();
        parent.renders.record(cx.pass());
        parent.flash.observe(parent.renders.get());

        let on_click = parent.gate.resolve(&(), || Msg::ChildClicked);
        let props = (self.clicks.value(), on_click);
        parent.button.render(cx, props);
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let palette = theme::palette();
        let stable = self.stable.value();
        let parent = self.parent.get();
        let shell = chrome::render_shell(
            frame,
            area,
            if stable { "Code: stable handler" } else { "Code: inline closure" },
        );
        chrome::render_code(
            frame,
            shell.code,
            if stable { &STABLE_CODE } else { &UNSTABLE_CODE },
        );

        let live = shell.live;
        let parent_inner = chrome::render_component_box(
            frame,
            Rect::new(live.x, live.y, live.width, live.height.min(11)),
            "Parent",
            parent.flash.is_active(),
        );
        let text = Style::new().fg(palette.fg);
        let muted = Style::new().fg(palette.muted);
        let right = parent_inner.right();
        frame.buffer.print_text_clipped(
            parent_inner.x,
            parent_inner.y,
            &format!("count = {}", self.count.get()),
            text,
            right,
        );
        frame.buffer.print_text_clipped(
            parent_inner.x,
            parent_inner.y + 1,
            &format!("renders: {}", parent.renders.get()),
            muted,
            right,
        );

        let button = &parent.button;
        let button_rect = Rect::new(
            parent_inner.x,
            parent_inner.y + 3,
            parent_inner.width,
            parent_inner.height.saturating_sub(3).min(6),
        );
        let button_inner = chrome::render_component_box(
            frame,
            button_rect,
            "memo(Button)",
            button.flash.is_active(),
        );
        let right = button_inner.right();
        let lines = [
            ("[ Click me ]".to_owned(), Style::new().fg(palette.accent)),
            (format!("clicks = {}", button.clicks), text),
            (format!("renders: {}", button.renders.get()), muted),
            (button.reason.label().to_owned(), chrome::reason_style(button.reason)),
        ];
        for (y, (line, style)) in (button_inner.y..button_inner.bottom()).zip(&lines) {
            frame
                .buffer
                .print_text_clipped(button_inner.x, y, line, *style, right);
        }

        let rows = [
            StatRow::new("parent renders", parent.renders.get())
                .highlighted(parent.flash.is_active()),
            StatRow::new("button renders", button.renders.get())
                .highlighted(button.flash.is_active()),
            StatRow::new("stable handler", if stable { "on" } else { "off" }),
            StatRow::new("closures created", self.closures_created()),
        ];
        let rest = chrome::render_stats(frame, shell.stats, &rows, self.keybindings());
        chrome::render_notes(frame, rest, if stable { &STABLE_NOTES } else { &UNSTABLE_NOTES });
    }

    fn tick(&self) {
        let parent = self.parent.get();
        parent.flash.tick();
        parent.button.flash.tick();
    }

    fn keybindings(&self) -> &'static [KeyHint] {
        KEYS
    }
}
