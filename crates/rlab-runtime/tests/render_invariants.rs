//! Property tests for the render instrumentation.
//!
//! Drives a small parent/child model through the simulator with arbitrary
//! interleavings of state changes, no-op events, resizes and ticks.

use proptest::prelude::*;
use rlab_core::event::Event;
use rlab_render::frame::Frame;
use rlab_runtime::hooks::{
    InstanceSlot, MemoGate, MemoMode, PropSnapshot, RenderCounter, RenderCx, RenderScheduler,
    State, Variant,
};
use rlab_runtime::program::{Cmd, Model};
use rlab_runtime::simulator::ProgramSimulator;

struct Child {
    renders: RenderCounter,
    gate: MemoGate<u32, u32>,
    snapshot: PropSnapshot<u32>,
}

impl Child {
    fn new(variant: Variant) -> Self {
        Self {
            renders: RenderCounter::new(),
            gate: MemoGate::new(MemoMode::from(variant)),
            snapshot: PropSnapshot::new(),
        }
    }
}

struct Parent {
    scheduler: RenderScheduler,
    count: State<u32>,
    prop: State<u32>,
    optimized: State<bool>,
    renders: RenderCounter,
    child: InstanceSlot<Child>,
}

impl Parent {
    fn new() -> Self {
        let scheduler = RenderScheduler::new();
        Self {
            count: State::new(0, &scheduler),
            prop: State::new(0, &scheduler),
            optimized: State::new(false, &scheduler),
            renders: RenderCounter::new(),
            child: InstanceSlot::new(Variant::Plain, Child::new),
            scheduler,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Bump,
    BumpProp,
    Toggle,
    Noop,
    Resize,
    Tick,
}

impl From<Event> for Op {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(k) if k.is_char('b') => Op::Bump,
            Event::Key(k) if k.is_char('p') => Op::BumpProp,
            Event::Key(k) if k.is_char('t') => Op::Toggle,
            _ => Op::Noop,
        }
    }
}

impl Model for Parent {
    type Message = Op;

    fn update(&mut self, msg: Op) -> Cmd<Op> {
        match msg {
            Op::Bump => {
                self.count.update(|c| c + 1);
            }
            Op::BumpProp => {
                self.prop.update(|p| p + 1);
            }
            Op::Toggle => {
                self.optimized.toggle();
            }
            Op::Noop | Op::Resize | Op::Tick => {}
        }
        Cmd::none()
    }

    fn render(&mut self, cx: &RenderCx) {
        self.renders.record(cx.pass());
        let variant = Variant::from_enabled(self.optimized.value());
        self.child.ensure(variant, Child::new);
        let prop = self.prop.value();
        let child = self.child.get_mut();
        let reason = child.snapshot.classify(&prop, true, variant.is_memoized());
        if reason.would_render() {
            child.renders.record(cx.pass());
            child.gate.compute(&prop, |p| p * 2);
        }
    }

    fn view(&self, _frame: &mut Frame) {}

    fn take_render_request(&mut self) -> bool {
        self.scheduler.take()
    }
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Bump),
        Just(Op::BumpProp),
        Just(Op::Toggle),
        Just(Op::Noop),
        Just(Op::Resize),
        Just(Op::Tick),
    ]
}

fn event_for(op: Op) -> Event {
    match op {
        Op::Bump => Event::char('b'),
        Op::BumpProp => Event::char('p'),
        Op::Toggle => Event::char('t'),
        Op::Noop => Event::char('z'),
        Op::Resize => Event::Resize {
            width: 60,
            height: 10,
        },
        Op::Tick => Event::Tick,
    }
}

proptest! {
    #[test]
    fn parent_counter_equals_render_passes(ops in proptest::collection::vec(op_strategy(), 0..60)) {
        let mut sim = ProgramSimulator::new(Parent::new());
        sim.init();
        for op in ops {
            sim.inject_event(event_for(op));
            prop_assert_eq!(sim.model().renders.get(), sim.render_passes());
        }
    }

    #[test]
    fn repaint_only_events_never_render(ops in proptest::collection::vec(
        prop_oneof![Just(Op::Noop), Just(Op::Resize), Just(Op::Tick)], 1..30)) {
        let mut sim = ProgramSimulator::new(Parent::new());
        sim.init();
        let before = sim.render_passes();
        for op in ops {
            sim.inject_event(event_for(op));
        }
        prop_assert_eq!(sim.render_passes(), before);
    }

    #[test]
    fn plain_child_renders_with_parent(bumps in 1usize..20) {
        let mut sim = ProgramSimulator::new(Parent::new());
        sim.init();
        for _ in 0..bumps {
            sim.inject_event(Event::char('b'));
        }
        let child = sim.model().child.get();
        prop_assert_eq!(child.renders.get(), 1 + bumps as u64);
        prop_assert_eq!(child.gate.computations(), 1 + bumps as u64);
    }
}

#[test]
fn toggle_resets_child_counters() {
    let mut sim = ProgramSimulator::new(Parent::new());
    sim.init();
    sim.type_text("bbb");
    assert_eq!(sim.model().child.get().renders.get(), 4);
    assert_eq!(sim.model().child.get().gate.computations(), 4);

    sim.type_text("t");
    let child = sim.model().child.get();
    assert_eq!(sim.model().child.variant(), Variant::Memoized);
    assert_eq!(child.renders.get(), 1);
    assert_eq!(child.gate.computations(), 1);

    sim.type_text("bbb");
    let child = sim.model().child.get();
    assert_eq!(child.renders.get(), 1, "memoized child skips parent renders");
    assert_eq!(child.gate.computations(), 1);

    sim.type_text("p");
    let child = sim.model().child.get();
    assert_eq!(child.renders.get(), 2);
    assert_eq!(child.gate.computations(), 2);
}
