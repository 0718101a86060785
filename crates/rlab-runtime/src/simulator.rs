#![forbid(unsafe_code)]

//! Deterministic program simulator for testing.
//!
//! `ProgramSimulator` drives a [`Model`] through the same sequence the
//! terminal runtime uses (init, render pass, paint, mounted, then
//! update/render/paint per message) without a terminal.
//!
//! ```ignore
//! let mut sim = ProgramSimulator::new(App::new(config));
//! sim.init();
//! sim.inject_event(Event::char('p'));
//! assert_eq!(sim.render_passes(), 3);
//! let text = sim.capture_frame().to_text();
//! ```

use std::time::Duration;

use rlab_core::event::Event;
use rlab_render::buffer::Buffer;
use rlab_render::frame::Frame;

use crate::hooks::PassClock;
use crate::program::{Cmd, Model};

/// Record of a command that was executed during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    None,
    Quit,
    Msg,
    Batch(usize),
    Tick(Duration),
}

/// Default simulated terminal size.
pub const DEFAULT_SIZE: (u16, u16) = (120, 32);

/// Headless twin of [`Program`](crate::program::Program).
pub struct ProgramSimulator<M: Model> {
    model: M,
    clock: PassClock,
    width: u16,
    height: u16,
    frames: Vec<Buffer>,
    command_log: Vec<CmdRecord>,
    running: bool,
    tick_rate: Option<Duration>,
    mounted: bool,
}

impl<M: Model> ProgramSimulator<M> {
    /// Create a simulator at [`DEFAULT_SIZE`]. Call [`init`](Self::init) next.
    pub fn new(model: M) -> Self {
        Self::with_size(model, DEFAULT_SIZE.0, DEFAULT_SIZE.1)
    }

    /// Create a simulator with an explicit terminal size.
    pub fn with_size(model: M, width: u16, height: u16) -> Self {
        Self {
            model,
            clock: PassClock::new(),
            width,
            height,
            frames: Vec::new(),
            command_log: Vec::new(),
            running: true,
            tick_rate: None,
            mounted: false,
        }
    }

    /// Start the model: init, first render pass, first paint, then `mounted`.
    ///
    /// Calling it again has no effect.
    pub fn init(&mut self) {
        if self.mounted {
            return;
        }
        let cmd = self.model.init();
        self.execute_cmd(cmd);
        self.render_pass();
        self.paint();
        self.mounted = true;
        let cmd = self.model.mounted();
        self.execute_cmd(cmd);
        self.after_update();
    }

    /// Inject terminal events in order.
    pub fn inject_events(&mut self, events: &[Event]) {
        for event in events {
            if !self.running {
                break;
            }
            if let Event::Resize { width, height } = *event {
                self.width = width;
                self.height = height;
            }
            self.dispatch(M::Message::from(event.clone()));
        }
    }

    /// Inject a single terminal event.
    pub fn inject_event(&mut self, event: Event) {
        self.inject_events(&[event]);
    }

    /// Type each character of `text` as a key press.
    pub fn type_text(&mut self, text: &str) {
        let events: Vec<Event> = text.chars().map(Event::char).collect();
        self.inject_events(&events);
    }

    /// Deliver one runtime tick.
    pub fn tick(&mut self) {
        self.inject_event(Event::Tick);
    }

    /// Send a message directly.
    pub fn send(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        self.dispatch(msg);
    }

    /// Paint the current state at the current size and return the buffer.
    ///
    /// Painting never runs a render pass.
    pub fn capture_frame(&mut self) -> &Buffer {
        self.paint();
        &self.frames[self.frames.len() - 1]
    }

    /// All painted frames, oldest first.
    pub fn frames(&self) -> &[Buffer] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Buffer> {
        self.frames.last()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Render passes run so far.
    pub fn render_passes(&self) -> u64 {
        self.clock.passes()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// `false` after a `Cmd::Quit`.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick_rate(&self) -> Option<Duration> {
        self.tick_rate
    }

    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    fn dispatch(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
        self.after_update();
    }

    fn after_update(&mut self) {
        if !self.running {
            return;
        }
        if self.model.take_render_request() {
            self.render_pass();
        }
        self.paint();
    }

    fn render_pass(&mut self) {
        let cx = self.clock.begin();
        self.model.render(&cx);
    }

    fn paint(&mut self) {
        let mut frame = Frame::new(self.width, self.height);
        self.model.view(&mut frame);
        self.frames.push(frame.into_buffer());
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => self.command_log.push(CmdRecord::None),
            Cmd::Quit => {
                self.running = false;
                self.command_log.push(CmdRecord::Quit);
            }
            Cmd::Msg(m) => {
                self.command_log.push(CmdRecord::Msg);
                let cmd = self.model.update(m);
                self.execute_cmd(cmd);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                for cmd in cmds {
                    self.execute_cmd(cmd);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Tick(interval) => {
                self.tick_rate = Some(interval);
                self.command_log.push(CmdRecord::Tick(interval));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{RenderCounter, RenderCx, RenderScheduler, State};
    use rlab_render::drawing::Draw;
    use rlab_render::style::Style;

    struct Counter {
        scheduler: RenderScheduler,
        value: State<u32>,
        renders: RenderCounter,
        mounted_calls: u32,
    }

    #[derive(Debug)]
    enum Msg {
        Inc,
        Noop,
        Quit,
    }

    impl From<Event> for Msg {
        fn from(event: Event) -> Self {
            match event {
                Event::Key(k) if k.is_char('+') => Msg::Inc,
                Event::Key(k) if k.is_char('q') => Msg::Quit,
                _ => Msg::Noop,
            }
        }
    }

    impl Counter {
        fn new() -> Self {
            let scheduler = RenderScheduler::new();
            Self {
                value: State::new(0, &scheduler),
                scheduler,
                renders: RenderCounter::new(),
                mounted_calls: 0,
            }
        }
    }

    impl Model for Counter {
        type Message = Msg;

        fn init(&mut self) -> Cmd<Msg> {
            Cmd::tick(Duration::from_millis(50))
        }

        fn update(&mut self, msg: Msg) -> Cmd<Msg> {
            match msg {
                Msg::Inc => {
                    self.value.update(|v| v + 1);
                    Cmd::none()
                }
                Msg::Noop => Cmd::none(),
                Msg::Quit => Cmd::quit(),
            }
        }

        fn render(&mut self, cx: &RenderCx) {
            self.renders.record(cx.pass());
        }

        fn view(&self, frame: &mut Frame) {
            let text = format!("value={} renders={}", self.value.get(), self.renders.get());
            frame.buffer.print_text(0, 0, &text, Style::new());
        }

        fn take_render_request(&mut self) -> bool {
            self.scheduler.take()
        }

        fn mounted(&mut self) -> Cmd<Msg> {
            self.mounted_calls += 1;
            Cmd::none()
        }
    }

    #[test]
    fn init_renders_paints_then_mounts() {
        let mut sim = ProgramSimulator::new(Counter::new());
        sim.init();
        sim.init();
        assert_eq!(sim.model().mounted_calls, 1);
        assert_eq!(sim.render_passes(), 1);
        assert_eq!(sim.tick_rate(), Some(Duration::from_millis(50)));
        assert!(sim.frames()[0].row_text(0).starts_with("value=0 renders=1"));
    }

    #[test]
    fn state_change_renders_once() {
        let mut sim = ProgramSimulator::new(Counter::new());
        sim.init();
        sim.inject_event(Event::char('+'));
        assert_eq!(sim.render_passes(), 2);
        assert_eq!(sim.model().renders.get(), 2);
        let text = sim.capture_frame().to_text();
        assert!(text.starts_with("value=1 renders=2"));
    }

    #[test]
    fn unrelated_events_only_repaint() {
        let mut sim = ProgramSimulator::new(Counter::new());
        sim.init();
        let frames_before = sim.frame_count();
        sim.inject_events(&[
            Event::char('x'),
            Event::Tick,
            Event::Resize {
                width: 40,
                height: 5,
            },
        ]);
        assert_eq!(sim.render_passes(), 1);
        assert_eq!(sim.frame_count(), frames_before + 3);
        let last = sim.last_frame().map(|b| (b.width(), b.height()));
        assert_eq!(last, Some((40, 5)));
    }

    #[test]
    fn quit_stops_processing() {
        let mut sim = ProgramSimulator::new(Counter::new());
        sim.init();
        sim.type_text("q+");
        assert!(!sim.is_running());
        assert_eq!(sim.model().value.value(), 0);
        assert!(sim.command_log().contains(&CmdRecord::Quit));
    }
}
