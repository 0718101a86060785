#![forbid(unsafe_code)]

//! Quitting from inside an update: the state change made alongside the
//! quit never reaches a render pass or a paint.

use rlab_core::event::Event;
use rlab_render::drawing::Draw;
use rlab_render::frame::Frame;
use rlab_render::style::Style;
use rlab_runtime::hooks::{RenderCounter, RenderCx, RenderScheduler, State};
use rlab_runtime::program::{Cmd, Model};
use rlab_runtime::simulator::{CmdRecord, ProgramSimulator};

struct Closing {
    scheduler: RenderScheduler,
    count: State<u32>,
    renders: RenderCounter,
}

#[derive(Debug)]
enum Msg {
    Bump,
    BumpAndQuit,
    BumpThenQuitInBatch,
    Ignored,
}

impl From<Event> for Msg {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(k) if k.is_char('+') => Msg::Bump,
            Event::Key(k) if k.is_char('q') => Msg::BumpAndQuit,
            _ => Msg::Ignored,
        }
    }
}

impl Closing {
    fn new() -> Self {
        let scheduler = RenderScheduler::new();
        Self {
            count: State::new(0, &scheduler),
            scheduler,
            renders: RenderCounter::new(),
        }
    }
}

impl Model for Closing {
    type Message = Msg;

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::Bump => {
                self.count.update(|n| n + 1);
                Cmd::none()
            }
            Msg::BumpAndQuit => {
                self.count.update(|n| n + 1);
                Cmd::quit()
            }
            Msg::BumpThenQuitInBatch => Cmd::batch(vec![Cmd::quit(), Cmd::msg(Msg::Bump)]),
            Msg::Ignored => Cmd::none(),
        }
    }

    fn render(&mut self, cx: &RenderCx) {
        self.renders.record(cx.pass());
    }

    fn view(&self, frame: &mut Frame) {
        let text = format!("count={} renders={}", self.count.get(), self.renders.get());
        frame.buffer.print_text(0, 0, &text, Style::new());
    }

    fn take_render_request(&mut self) -> bool {
        self.scheduler.take()
    }
}

fn started() -> ProgramSimulator<Closing> {
    let mut sim = ProgramSimulator::new(Closing::new());
    sim.init();
    sim
}

#[test]
fn state_set_with_quit_is_never_rendered() {
    let mut sim = started();
    sim.type_text("+");
    assert_eq!(sim.render_passes(), 2);
    let frames = sim.frame_count();

    sim.type_text("q");
    assert!(!sim.is_running());
    assert_eq!(sim.model().count.value(), 2);
    assert_eq!(sim.render_passes(), 2, "no render pass after quit");
    assert_eq!(sim.model().renders.get(), 2);
    assert_eq!(sim.frame_count(), frames, "no paint after quit");
    let last = sim.last_frame().map(|b| b.row_text(0));
    assert!(last.is_some_and(|row| row.starts_with("count=1 renders=2")));
}

#[test]
fn quit_inside_a_batch_skips_the_rest_of_the_batch() {
    let mut sim = started();
    sim.send(Msg::BumpThenQuitInBatch);
    assert!(!sim.is_running());
    assert_eq!(sim.model().count.value(), 0);
    assert_eq!(sim.render_passes(), 1);
    assert_eq!(sim.command_log().last(), Some(&CmdRecord::Quit));
}

#[test]
fn input_after_quit_is_dropped() {
    let mut sim = started();
    sim.type_text("q++");
    sim.send(Msg::Bump);
    assert_eq!(sim.model().count.value(), 1);
    assert_eq!(sim.render_passes(), 1);
}
