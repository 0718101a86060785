#![forbid(unsafe_code)]

//! Cached computation playground.
//!
//! The parent keeps an unrelated counter and a filter string. Every render
//! filters a generated item list through an artificially slow function.
//! Uncached, the filter runs on every render; cached, it only runs when the
//! filter string changes. Toggling caching remounts the component, so both
//! its render count and its computation count start over.

use std::hint::black_box;

use rlab_core::event::{Event, KeyCode};
use rlab_core::geometry::Rect;
use rlab_render::cell::StyleFlags;
use rlab_render::drawing::Draw;
use rlab_render::frame::Frame;
use rlab_render::style::Style;
use rlab_runtime::hooks::{
    InstanceSlot, MemoGate, MemoMode, RenderCounter, RenderCx, RenderFlash, RenderScheduler,
    State, Variant,
};
use rlab_runtime::program::Cmd;

use super::{KeyHint, Screen, key_press};
use crate::chrome::{self, CodeSample, Notes, StatRow};
use crate::theme;

/// Items in the generated list.
pub const ITEM_COUNT: usize = 240;

/// Default busy-loop iterations per item.
pub const DEFAULT_WORK_FACTOR: u32 = 2_000;

const WORDS: &[&str] = &[
    "apple", "banana", "cherry", "damson", "elder", "fig", "grape", "guava", "kiwi", "lemon",
    "lime", "mango", "melon", "olive", "peach", "pear", "plum", "quince",
];

const UNCACHED_CODE: CodeSample = CodeSample::new(
    "\
// MemoMode::Uncached: compute() runs the
// filter on every call, even when only
// `count` changed.
fn render(&mut self, cx: &RenderCx) {
    let mounted = self.mounted.get_mut();
    mounted.renders.record(cx.pass());
    let items = &self.items;
    let work_factor = self.work_factor;
    mounted.gate.compute(self.filter.get(), |needle| {
        filter_items(items, needle, work_factor)
    });
}",
    None,
);

const CACHED_CODE: CodeSample = CodeSample::new(
    "\
// MemoMode::Cached: compute() re-runs the
// filter only when `filter` differs from
// the value it last ran with.
fn render(&mut self, cx: &RenderCx) {
    let mounted = self.mounted.get_mut();
    mounted.renders.record(cx.pass());
    let items = &self.items;
    let work_factor = self.work_factor;
    mounted.gate.compute(self.filter.get(), |needle| {
        filter_items(items, needle, work_factor)
    });
}",
    Some((9, 11)),
);

const HOW_TO_TEST: &[&str] = &[
    "Press + and watch the render and computation counts.",
    "Edit the filter with / and see the computation count rise.",
    "Toggle caching with m to compare.",
    "The component renders every time either way; only the filter work is skipped.",
];

const UNCACHED_NOTES: Notes = Notes {
    how_to_test: HOW_TO_TEST,
    behavior: "The filter runs on every render, even when the filter text did not \
               change, so the computation count follows the render count.",
    caveat: None,
};

const CACHED_NOTES: Notes = Notes {
    how_to_test: HOW_TO_TEST,
    behavior: "The filter only runs when its dependency changes. Pressing + still \
               renders, but the cached result is reused.",
    caveat: Some((
        "Caching skips work, not renders",
        "The render count keeps rising with every state change. Only the \
         expensive call is avoided.",
    )),
};

const KEYS: &[KeyHint] = &[
    ("+", "increment count"),
    ("/", "edit filter"),
    ("m", "toggle caching"),
];

/// Build the demo item list.
pub fn generate_items(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("{} {:03}", WORDS[i % WORDS.len()], i))
        .collect()
}

/// The expensive computation: indices of items containing `needle`
/// (case-insensitive), after spinning `work_factor` iterations per item.
pub fn filter_items(items: &[String], needle: &str, work_factor: u32) -> Vec<usize> {
    let needle = needle.to_lowercase();
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| {
            let mut acc = 0u64;
            for i in 0..work_factor {
                acc = black_box(acc.wrapping_mul(31).wrapping_add(u64::from(i)));
            }
            item.to_lowercase().contains(&needle)
        })
        .map(|(i, _)| i)
        .collect()
}

/// Everything that belongs to one mount of the component.
#[derive(Debug)]
struct Mounted {
    renders: RenderCounter,
    flash: RenderFlash,
    gate: MemoGate<String, Vec<usize>>,
    computed_this_pass: bool,
}

impl Mounted {
    fn new(variant: Variant) -> Self {
        Self {
            renders: RenderCounter::new(),
            flash: RenderFlash::new(),
            gate: MemoGate::new(MemoMode::from(variant)),
            computed_this_pass: false,
        }
    }
}

/// Cached computation playground state.
#[derive(Debug)]
pub struct ComputationPlayground {
    count: State<u64>,
    filter: State<String>,
    cached: State<bool>,
    editing: bool,
    mounted: InstanceSlot<Mounted>,
    items: Vec<String>,
    work_factor: u32,
}

impl ComputationPlayground {
    pub fn new(scheduler: &RenderScheduler, work_factor: u32) -> Self {
        Self {
            count: State::new(0, scheduler),
            filter: State::new(String::new(), scheduler),
            cached: State::new(false, scheduler),
            editing: false,
            mounted: InstanceSlot::new(Variant::Plain, Mounted::new),
            items: generate_items(ITEM_COUNT),
            work_factor,
        }
    }

    /// Render passes since the component was last mounted.
    pub fn renders(&self) -> u64 {
        self.mounted.get().renders.get()
    }

    /// Real invocations of the filter since the component was last mounted.
    pub fn computations(&self) -> u64 {
        self.mounted.get().gate.computations()
    }

    pub fn count(&self) -> u64 {
        self.count.value()
    }

    pub fn cached(&self) -> bool {
        self.cached.value()
    }

    pub fn filter(&self) -> &str {
        self.filter.get()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Items matched by the latest computation.
    pub fn visible_count(&self) -> usize {
        self.mounted.get().gate.latest().map_or(0, Vec::len)
    }

    fn edit(&mut self, event: &Event) {
        match event {
            Event::Paste(text) => {
                for c in text.chars().filter(|c| !c.is_control()) {
                    self.filter.push(c);
                }
            }
            Event::Key(key) if key.is_actionable() => match key.code {
                KeyCode::Escape | KeyCode::Enter => self.editing = false,
                KeyCode::Backspace => {
                    self.filter.pop();
                }
                KeyCode::Char(c) if !key.ctrl() => self.filter.push(c),
                _ => {}
            },
            _ => {}
        }
    }
}

impl Screen for ComputationPlayground {
    type Message = std::convert::Infallible;

    fn update(&mut self, event: &Event) -> Cmd<Self::Message> {
        if self.editing {
            self.edit(event);
            return Cmd::none();
        }
        let Some(key) = key_press(event) else {
            return Cmd::none();
        };
        match key.code {
            KeyCode::Char('+' | 'p') => {
                self.count.update(|n| n + 1);
            }
            KeyCode::Char('m' | ' ') => {
                let on = self.cached.toggle();
                tracing::info!(cached = on, "caching toggled");
            }
            KeyCode::Char('/') => self.editing = true,
            _ => {}
        }
        Cmd::none()
    }

    fn handle_message(&mut self, msg: Self::Message) -> Cmd<Self::Message> {
        match msg {}
    }

    fn render(&mut self, cx: &RenderCx) {
        let variant = Variant::from_enabled(self.cached.value());
        self.mounted.ensure(variant, Mounted::new);
        let mounted = self.mounted.get_mut();
        mounted.renders.record(cx.pass());
        mounted.flash.observe(mounted.renders.get());

        let before = mounted.gate.computations();
        let items = &self.items;
        let work_factor = self.work_factor;
        mounted
            .gate
            .compute(self.filter.get(), |needle| filter_items(items, needle, work_factor));
        mounted.computed_this_pass = mounted.gate.computations() != before;
        tracing::trace!(
            pass = cx.pass().get(),
            computed = mounted.computed_this_pass,
            "computation pass"
        );
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let palette = theme::palette();
        let cached = self.cached.value();
        let shell = chrome::render_shell(
            frame,
            area,
            if cached { "Code: cached" } else { "Code: uncached" },
        );
        chrome::render_code(
            frame,
            shell.code,
            if cached { &CACHED_CODE } else { &UNCACHED_CODE },
        );

        let mounted = self.mounted.get();
        let live = shell.live;
        let inner =
            chrome::render_component_box(frame, live, "Filtered list", mounted.flash.is_active());
        let right = inner.right();
        let text = Style::new().fg(palette.fg);
        let muted = Style::new().fg(palette.muted);

        let filter_style = if self.editing {
            Style::new().fg(palette.accent).attrs(StyleFlags::UNDERLINE)
        } else {
            text
        };
        let x = frame
            .buffer
            .print_text_clipped(inner.x, inner.y, "filter: ", muted, right);
        let end = frame
            .buffer
            .print_text_clipped(x, inner.y, self.filter.get(), filter_style, right);
        if self.editing && end < right {
            frame.set_cursor(Some((end, inner.y)));
        }
        frame.buffer.print_text_clipped(
            inner.x,
            inner.y + 1,
            &format!("count = {}", self.count.get()),
            text,
            right,
        );
        frame.buffer.print_text_clipped(
            inner.x,
            inner.y + 2,
            &format!("{} of {} items", self.visible_count(), self.items.len()),
            muted,
            right,
        );

        let list_top = inner.y + 4;
        let visible = mounted.gate.latest().map_or(&[][..], Vec::as_slice);
        for (row, &index) in visible.iter().enumerate() {
            let Ok(row) = u16::try_from(row) else { break };
            let y = list_top + row;
            if y >= inner.bottom() {
                break;
            }
            if let Some(item) = self.items.get(index) {
                frame.buffer.print_text_clipped(inner.x, y, item, text, right);
            }
        }

        let rows = [
            StatRow::new("renders", mounted.renders.get()).highlighted(mounted.flash.is_active()),
            StatRow::new("computations", self.computations())
                .highlighted(mounted.computed_this_pass && mounted.flash.is_active()),
            StatRow::new("caching", if cached { "on" } else { "off" }),
            StatRow::new("work / item", self.work_factor),
        ];
        let rest = chrome::render_stats(frame, shell.stats, &rows, self.keybindings());
        chrome::render_notes(frame, rest, if cached { &CACHED_NOTES } else { &UNCACHED_NOTES });
    }

    fn tick(&self) {
        self.mounted.get().flash.tick();
    }

    fn captures_text(&self) -> bool {
        self.editing
    }

    fn keybindings(&self) -> &'static [KeyHint] {
        KEYS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlab_runtime::hooks::PassClock;

    struct Harness {
        scheduler: RenderScheduler,
        clock: PassClock,
        screen: ComputationPlayground,
    }

    impl Harness {
        fn new() -> Self {
            let scheduler = RenderScheduler::new();
            let screen = ComputationPlayground::new(&scheduler, 1);
            let mut h = Self {
                scheduler,
                clock: PassClock::new(),
                screen,
            };
            let cx = h.clock.begin();
            h.screen.render(&cx);
            h
        }

        fn send(&mut self, event: Event) {
            let _ = self.screen.update(&event);
            if self.scheduler.take() {
                let cx = self.clock.begin();
                self.screen.render(&cx);
            }
        }

        fn type_text(&mut self, text: &str) {
            for c in text.chars() {
                self.send(Event::char(c));
            }
        }
    }

    #[test]
    fn filter_is_case_insensitive() {
        let items = generate_items(40);
        let hits = filter_items(&items, "APPLE", 0);
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|&i| items[i].starts_with("apple")));
        assert_eq!(filter_items(&items, "", 0).len(), 40);
    }

    #[test]
    fn uncached_recomputes_every_render() {
        let mut h = Harness::new();
        h.type_text("+++");
        assert_eq!(h.screen.renders(), 4);
        assert_eq!(h.screen.computations(), 4);
    }

    #[test]
    fn cached_recomputes_only_on_filter_change() {
        let mut h = Harness::new();
        h.type_text("m");
        assert_eq!(h.screen.computations(), 1);
        h.type_text("+++++");
        assert_eq!(h.screen.computations(), 1);

        h.type_text("/a");
        assert!(h.screen.is_editing());
        assert_eq!(h.screen.filter(), "a");
        assert_eq!(h.screen.computations(), 2);

        h.send(Event::key(KeyCode::Escape));
        assert!(!h.screen.is_editing());
        h.type_text("+");
        assert_eq!(h.screen.computations(), 2);
    }

    #[test]
    fn toggling_caching_restarts_both_counters() {
        let mut h = Harness::new();
        h.type_text("+++");
        assert_eq!(h.screen.renders(), 4);
        assert_eq!(h.screen.computations(), 4);

        h.type_text("m");
        assert_eq!(h.screen.renders(), 1);
        assert_eq!(h.screen.computations(), 1);
        assert_eq!(h.screen.count(), 3);

        h.type_text("m");
        assert_eq!(h.screen.renders(), 1);
        assert_eq!(h.screen.computations(), 1);
    }

    #[test]
    fn editing_captures_command_keys() {
        let mut h = Harness::new();
        h.type_text("/m+");
        assert_eq!(h.screen.filter(), "m+");
        assert!(!h.screen.cached());
        h.send(Event::key(KeyCode::Backspace));
        assert_eq!(h.screen.filter(), "m");
    }

    #[test]
    fn paste_appends_while_editing() {
        let mut h = Harness::new();
        h.type_text("/");
        h.send(Event::Paste("pe\nar".into()));
        assert_eq!(h.screen.filter(), "pear");
        assert!(h.screen.visible_count() > 0);
    }
}
