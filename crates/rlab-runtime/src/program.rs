#![forbid(unsafe_code)]

//! Program runtime (Elm-style plus an explicit render pass).
//!
//! A [`Model`] separates three kinds of work:
//!
//! - `update` handles a message and may set reactive state.
//! - `render` is the **render pass**: component bodies run, counters record,
//!   memo gates compute. It only runs when the model reports a pending
//!   render request after an update.
//! - `view` is the **paint**: it draws the latest rendered output into a
//!   frame. Resizes and ticks repaint without a render pass.
//!
//! `mounted` runs exactly once, after the first frame has been painted.
//!
//! # Example
//!
//! ```ignore
//! use rlab_runtime::program::{Cmd, Model, Program};
//!
//! struct Counter { count: i32 }
//!
//! enum Msg { Increment, Quit }
//!
//! impl From<Event> for Msg {
//!     fn from(event: Event) -> Self {
//!         match event {
//!             Event::Key(k) if k.is_char('q') => Msg::Quit,
//!             _ => Msg::Increment,
//!         }
//!     }
//! }
//!
//! impl Model for Counter {
//!     type Message = Msg;
//!
//!     fn update(&mut self, msg: Msg) -> Cmd<Msg> {
//!         match msg {
//!             Msg::Increment => { self.count += 1; Cmd::none() }
//!             Msg::Quit => Cmd::quit(),
//!         }
//!     }
//!
//!     fn view(&self, frame: &mut Frame) {
//!         // Draw counter
//!     }
//! }
//! ```

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use rlab_core::event::Event;
use rlab_core::terminal_session::{SessionOptions, TerminalSession};
use rlab_render::buffer::Buffer;
use rlab_render::diff::BufferDiff;
use rlab_render::frame::Frame;
use rlab_render::presenter::Presenter;
use tracing::{debug, info, info_span};

use crate::hooks::{PassClock, RenderCx};

/// The application model.
pub trait Model: Sized {
    /// Messages are built from terminal events and from commands.
    type Message: From<Event> + 'static;

    /// Startup commands. Runs before the first render pass.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Handle one message.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Run one render pass.
    ///
    /// The runtime calls this once at startup and then once after every
    /// update for which [`take_render_request`](Self::take_render_request)
    /// returns `true`.
    fn render(&mut self, cx: &RenderCx) {
        let _ = cx;
    }

    /// Paint the latest rendered output. Must not mutate model state.
    fn view(&self, frame: &mut Frame);

    /// Drain the model's pending render request.
    ///
    /// The default renders after every update. Models with reactive state
    /// return their scheduler's pending flag instead.
    fn take_render_request(&mut self) -> bool {
        true
    }

    /// One-time effect after the first paint.
    fn mounted(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }
}

/// Commands represent side effects to execute.
pub enum Cmd<M> {
    /// No operation.
    None,
    /// Quit the application.
    Quit,
    /// Execute multiple commands as a batch.
    Batch(Vec<Cmd<M>>),
    /// Send a message to the model within the same update.
    Msg(M),
    /// Set the tick interval.
    Tick(Duration),
}

impl<M> Default for Cmd<M> {
    fn default() -> Self {
        Self::None
    }
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Tick(d) => f.debug_tuple("Tick").field(d).finish(),
        }
    }
}

impl<M> Cmd<M> {
    /// Create a no-op command.
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    /// Create a quit command.
    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    /// Create a message command.
    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Create a tick command.
    #[inline]
    pub fn tick(interval: Duration) -> Self {
        Self::Tick(interval)
    }

    /// Create a batch of commands.
    pub fn batch(mut cmds: Vec<Self>) -> Self {
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or_default(),
            _ => Self::Batch(cmds),
        }
    }

    /// Convert the message type, e.g. to lift a screen message into an app message.
    pub fn map<N>(self, f: impl Fn(M) -> N) -> Cmd<N> {
        self.map_with(&f)
    }

    fn map_with<N>(self, f: &dyn Fn(M) -> N) -> Cmd<N> {
        match self {
            Self::None => Cmd::None,
            Self::Quit => Cmd::Quit,
            Self::Batch(cmds) => Cmd::Batch(cmds.into_iter().map(|c| c.map_with(f)).collect()),
            Self::Msg(m) => Cmd::Msg(f(m)),
            Self::Tick(d) => Cmd::Tick(d),
        }
    }

    /// Stable name for tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Msg(_) => "Msg",
            Self::Tick(_) => "Tick",
        }
    }
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    /// Use the alternate screen buffer.
    pub alternate_screen: bool,
    /// Enable bracketed paste.
    pub bracketed_paste: bool,
    /// Input poll timeout when no tick is due sooner.
    pub poll_timeout: Duration,
    /// Forced terminal size (resize events still repaint).
    pub forced_size: Option<(u16, u16)>,
    /// Quit automatically after this long.
    pub exit_after: Option<Duration>,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            bracketed_paste: true,
            poll_timeout: Duration::from_millis(100),
            forced_size: None,
            exit_after: None,
        }
    }
}

/// Terminal program runner.
pub struct Program<M: Model> {
    model: M,
    session: TerminalSession,
    presenter: Presenter<Stdout>,
    previous: Option<Buffer>,
    width: u16,
    height: u16,
    running: bool,
    tick_rate: Option<Duration>,
    last_tick: Instant,
    clock: PassClock,
    config: ProgramConfig,
    needs_paint: bool,
}

impl<M: Model> Program<M> {
    /// Create a program with the default configuration.
    pub fn new(model: M) -> io::Result<Self> {
        Self::with_config(model, ProgramConfig::default())
    }

    /// Enter the terminal session and create a program.
    pub fn with_config(model: M, config: ProgramConfig) -> io::Result<Self> {
        let session = TerminalSession::new(SessionOptions {
            alternate_screen: config.alternate_screen,
            bracketed_paste: config.bracketed_paste,
        })?;
        let (width, height) = match config.forced_size {
            Some(size) => size,
            None => session.size()?,
        };
        Ok(Self {
            model,
            session,
            presenter: Presenter::new(io::stdout()),
            previous: None,
            width,
            height,
            running: true,
            tick_rate: None,
            last_tick: Instant::now(),
            clock: PassClock::new(),
            config,
            needs_paint: true,
        })
    }

    /// Run until the model quits (or `exit_after` elapses).
    pub fn run(&mut self) -> io::Result<()> {
        let started = Instant::now();

        let cmd = {
            let _span = info_span!("rlab.program.init").entered();
            self.model.init()
        };
        self.execute_cmd(cmd)?;

        self.render_pass();
        self.paint()?;

        let cmd = self.model.mounted();
        self.execute_cmd(cmd)?;
        self.after_update();
        info!(
            width = self.width,
            height = self.height,
            "program mounted"
        );

        while self.running {
            if self
                .config
                .exit_after
                .is_some_and(|limit| started.elapsed() >= limit)
            {
                info!("exit-after elapsed; quitting");
                break;
            }

            if self.session.poll_event(self.effective_timeout())? {
                loop {
                    if let Some(event) = self.session.read_event()? {
                        self.handle_event(event)?;
                    }
                    if !self.running || !self.session.poll_event(Duration::ZERO)? {
                        break;
                    }
                }
            }

            if self.should_tick() {
                self.last_tick = Instant::now();
                self.dispatch(M::Message::from(Event::Tick))?;
            }

            if self.needs_paint && self.running {
                self.paint()?;
            }
        }
        Ok(())
    }

    /// Access the model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Render passes run so far.
    pub fn render_passes(&self) -> u64 {
        self.clock.passes()
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        if let Event::Resize { width, height } = event {
            if self.config.forced_size.is_none() {
                self.width = width;
                self.height = height;
            }
            self.previous = None;
            self.presenter.reset();
            self.presenter.clear_screen()?;
            self.needs_paint = true;
        }
        self.dispatch(M::Message::from(event))
    }

    fn dispatch(&mut self, msg: M::Message) -> io::Result<()> {
        let cmd = self.model.update(msg);
        debug!(cmd = cmd.type_name(), "update");
        self.execute_cmd(cmd)?;
        self.after_update();
        Ok(())
    }

    fn after_update(&mut self) {
        if !self.running {
            return;
        }
        if self.model.take_render_request() {
            self.render_pass();
        }
        self.needs_paint = true;
    }

    fn render_pass(&mut self) {
        let cx = self.clock.begin();
        let _span = info_span!("rlab.program.render", pass = cx.pass().get()).entered();
        self.model.render(&cx);
    }

    fn paint(&mut self) -> io::Result<()> {
        let mut frame = Frame::new(self.width, self.height);
        self.model.view(&mut frame);
        let cursor = frame.cursor();
        let buffer = frame.into_buffer();
        let diff = match &self.previous {
            Some(previous) => BufferDiff::compute(previous, &buffer),
            None => BufferDiff::full(&buffer),
        };
        self.presenter.present(&buffer, &diff)?;
        self.presenter.set_cursor(cursor)?;
        self.previous = Some(buffer);
        self.needs_paint = false;
        Ok(())
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) -> io::Result<()> {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => self.running = false,
            Cmd::Msg(m) => {
                let cmd = self.model.update(m);
                self.execute_cmd(cmd)?;
            }
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.execute_cmd(cmd)?;
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Tick(interval) => {
                self.tick_rate = Some(interval);
                self.last_tick = Instant::now();
            }
        }
        Ok(())
    }

    fn effective_timeout(&self) -> Duration {
        match self.tick_rate {
            Some(rate) => rate
                .saturating_sub(self.last_tick.elapsed())
                .min(self.config.poll_timeout),
            None => self.config.poll_timeout,
        }
    }

    fn should_tick(&self) -> bool {
        self.tick_rate
            .is_some_and(|rate| self.last_tick.elapsed() >= rate)
    }
}
