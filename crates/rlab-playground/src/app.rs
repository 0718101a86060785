#![forbid(unsafe_code)]

//! Main application model and routing.
//!
//! [`AppModel`] owns the render scheduler, the active playground and the
//! theme store. The active playground is rebuilt on every route change, so
//! its counters start fresh, as if the page had been mounted anew.

use std::time::Duration;

use rlab_core::event::{Event, KeyCode, KeyEvent, Modifiers};
use rlab_render::drawing::clear_area;
use rlab_render::frame::Frame;
use rlab_runtime::hooks::{RenderCounter, RenderCx, RenderScheduler, State};
use rlab_runtime::program::{Cmd, Model};

use crate::chrome::{self, StatusBarState};
use crate::screens::Screen;
use crate::screens::callback_playground::{self, CallbackPlayground};
use crate::screens::computation_playground::{ComputationPlayground, DEFAULT_WORK_FACTOR};
use crate::screens::memo_playground::MemoPlayground;
use crate::screens::overview::Overview;
use crate::theme::{self, ThemePreference, ThemeScope, ThemeStore};

/// Interval of the runtime tick that decays render flashes.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

const GLOBAL_HINT: &str = "0-3/Tab switch · t theme · q quit";

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// Identifies which screen is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenId {
    /// Overview of the playgrounds.
    Home,
    /// Component memoization.
    Memo,
    /// Stable callback references.
    Callback,
    /// Cached computation.
    Computation,
}

impl ScreenId {
    /// All routes in tab order.
    pub const ALL: [ScreenId; 4] = [
        ScreenId::Home,
        ScreenId::Memo,
        ScreenId::Callback,
        ScreenId::Computation,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&s| s == self).unwrap_or(0)
    }

    /// Tab number: 0 for the overview, 1-3 for the playgrounds.
    pub fn number(self) -> u16 {
        self.index() as u16
    }

    /// Next route (wraps around).
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous route (wraps around).
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Route from a tab number.
    pub fn from_number(n: u16) -> Option<Self> {
        Self::ALL.get(usize::from(n)).copied()
    }

    /// Title for the tab bar.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Overview",
            Self::Memo => "Component Memo",
            Self::Callback => "Stable Callback",
            Self::Computation => "Cached Computation",
        }
    }

    /// Route name used by `--route` and `RENDERLAB_ROUTE`.
    pub const fn route(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Memo => "memo",
            Self::Callback => "callback",
            Self::Computation => "use-memo",
        }
    }

    /// Parse a route name (case-insensitive; `use_memo` is accepted too).
    pub fn from_route(raw: &str) -> Option<Self> {
        let raw = raw.trim().trim_start_matches('/');
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.route().eq_ignore_ascii_case(raw))
            .or_else(|| raw.eq_ignore_ascii_case("use_memo").then_some(Self::Computation))
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Top-level application messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMsg {
    /// A terminal event for the app or the active screen.
    ScreenEvent(Event),
    /// Produced by the callback playground's button handler.
    Callback(callback_playground::Msg),
    SwitchScreen(ScreenId),
    NextScreen,
    PrevScreen,
    ToggleTheme,
    /// Runtime tick (paint only).
    Tick,
    Resize {
        width: u16,
        height: u16,
    },
    Quit,
}

impl From<Event> for AppMsg {
    fn from(event: Event) -> Self {
        match event {
            Event::Resize { width, height } => Self::Resize { width, height },
            Event::Tick => Self::Tick,
            other => Self::ScreenEvent(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Active screen
// ---------------------------------------------------------------------------

enum ActiveScreen {
    Overview(Overview),
    Memo(MemoPlayground),
    Callback(CallbackPlayground),
    Computation(ComputationPlayground),
}

/// Run `$body` against whichever playground is mounted.
macro_rules! with_screen {
    ($active:expr, $screen:ident => $body:expr) => {
        match $active {
            ActiveScreen::Overview($screen) => $body,
            ActiveScreen::Memo($screen) => $body,
            ActiveScreen::Callback($screen) => $body,
            ActiveScreen::Computation($screen) => $body,
        }
    };
}

impl ActiveScreen {
    fn mount(id: ScreenId, scheduler: &RenderScheduler, work_factor: u32) -> Self {
        match id {
            ScreenId::Home => Self::Overview(Overview::new()),
            ScreenId::Memo => Self::Memo(MemoPlayground::new(scheduler)),
            ScreenId::Callback => Self::Callback(CallbackPlayground::new(scheduler)),
            ScreenId::Computation => {
                Self::Computation(ComputationPlayground::new(scheduler, work_factor))
            }
        }
    }

    fn update(&mut self, event: &Event) -> Cmd<AppMsg> {
        match self {
            Self::Overview(s) => s.update(event).map(|never| match never {}),
            Self::Memo(s) => s.update(event).map(|never| match never {}),
            Self::Callback(s) => s.update(event).map(AppMsg::Callback),
            Self::Computation(s) => s.update(event).map(|never| match never {}),
        }
    }
}

// ---------------------------------------------------------------------------
// AppModel
// ---------------------------------------------------------------------------

/// Startup options for [`AppModel`].
#[derive(Debug, Clone, Copy)]
pub struct AppConfig {
    pub start_screen: ScreenId,
    /// Busy-loop iterations per item in the cached computation playground.
    pub work_factor: u32,
    /// Theme to set (and persist) once the store has loaded.
    pub initial_theme: Option<ThemePreference>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            start_screen: ScreenId::Memo,
            work_factor: DEFAULT_WORK_FACTOR,
            initial_theme: None,
        }
    }
}

/// Top-level application state.
pub struct AppModel {
    scheduler: RenderScheduler,
    current: State<ScreenId>,
    screen: ActiveScreen,
    theme: ThemeStore,
    renders: RenderCounter,
    work_factor: u32,
    initial_theme: Option<ThemePreference>,
    tick_count: u64,
}

impl AppModel {
    pub fn new(config: AppConfig, theme: ThemeStore) -> Self {
        let scheduler = RenderScheduler::new();
        Self {
            current: State::new(config.start_screen, &scheduler),
            screen: ActiveScreen::mount(config.start_screen, &scheduler, config.work_factor),
            theme,
            renders: RenderCounter::new(),
            work_factor: config.work_factor,
            initial_theme: config.initial_theme,
            tick_count: 0,
            scheduler,
        }
    }

    pub fn current_screen(&self) -> ScreenId {
        self.current.value()
    }

    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    /// Render passes seen by the app shell.
    pub fn render_count(&self) -> u64 {
        self.renders.get()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn overview(&self) -> Option<&Overview> {
        match &self.screen {
            ActiveScreen::Overview(s) => Some(s),
            _ => None,
        }
    }

    pub fn memo(&self) -> Option<&MemoPlayground> {
        match &self.screen {
            ActiveScreen::Memo(s) => Some(s),
            _ => None,
        }
    }

    pub fn callback(&self) -> Option<&CallbackPlayground> {
        match &self.screen {
            ActiveScreen::Callback(s) => Some(s),
            _ => None,
        }
    }

    pub fn computation(&self) -> Option<&ComputationPlayground> {
        match &self.screen {
            ActiveScreen::Computation(s) => Some(s),
            _ => None,
        }
    }

    fn captures_text(&self) -> bool {
        with_screen!(&self.screen, s => s.captures_text())
    }

    /// Keys handled by the app before the active screen sees them.
    fn global_action(&self, key: &KeyEvent) -> Option<AppMsg> {
        if key.code == KeyCode::Char('c') && key.ctrl() {
            return Some(AppMsg::Quit);
        }
        if self.captures_text() {
            return None;
        }
        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), Modifiers::NONE) => Some(AppMsg::Quit),
            (KeyCode::Char('t'), Modifiers::NONE) => Some(AppMsg::ToggleTheme),
            (KeyCode::Tab, _) => Some(AppMsg::NextScreen),
            (KeyCode::BackTab, _) => Some(AppMsg::PrevScreen),
            (KeyCode::Char(c @ '0'..='9'), _) => c
                .to_digit(10)
                .and_then(|n| ScreenId::from_number(n as u16))
                .map(AppMsg::SwitchScreen),
            _ => None,
        }
    }

    fn switch_to(&mut self, id: ScreenId) {
        let from = self.current.value();
        if self.current.set(id) {
            tracing::info!(from = from.route(), to = id.route(), "switching playground");
            self.screen = ActiveScreen::mount(id, &self.scheduler, self.work_factor);
        }
    }
}

impl Model for AppModel {
    type Message = AppMsg;

    fn init(&mut self) -> Cmd<AppMsg> {
        tracing::info!(
            route = self.current.value().route(),
            work_factor = self.work_factor,
            "render lab starting"
        );
        Cmd::tick(TICK_INTERVAL)
    }

    fn update(&mut self, msg: AppMsg) -> Cmd<AppMsg> {
        match msg {
            AppMsg::Quit => Cmd::quit(),
            AppMsg::SwitchScreen(id) => {
                self.switch_to(id);
                Cmd::none()
            }
            AppMsg::NextScreen => {
                self.switch_to(self.current.value().next());
                Cmd::none()
            }
            AppMsg::PrevScreen => {
                self.switch_to(self.current.value().prev());
                Cmd::none()
            }
            AppMsg::ToggleTheme => {
                let theme = self.theme.toggle();
                tracing::info!(theme = theme.as_str(), "theme toggled");
                Cmd::none()
            }
            AppMsg::Tick => {
                self.tick_count += 1;
                with_screen!(&self.screen, s => s.tick());
                Cmd::none()
            }
            AppMsg::Resize { width, height } => {
                tracing::debug!(width, height, "resized");
                Cmd::none()
            }
            AppMsg::Callback(msg) => match &mut self.screen {
                ActiveScreen::Callback(s) => s.handle_message(msg).map(AppMsg::Callback),
                _ => {
                    tracing::debug!(?msg, "callback message for inactive playground");
                    Cmd::none()
                }
            },
            AppMsg::ScreenEvent(event) => {
                if let Event::Key(key) = &event {
                    if !key.is_actionable() {
                        return Cmd::none();
                    }
                    if let Some(action) = self.global_action(key) {
                        return self.update(action);
                    }
                }
                self.screen.update(&event)
            }
        }
    }

    fn render(&mut self, cx: &RenderCx) {
        self.renders.record(cx.pass());
        with_screen!(&mut self.screen, s => s.render(cx));
    }

    fn view(&self, frame: &mut Frame) {
        let _scope = ThemeScope::enter(self.theme.get().palette());
        let palette = theme::palette();
        let area = frame.area();
        clear_area(&mut frame.buffer, area, palette.base());

        let (tabs, rest) = area.split_top(1);
        let (content, status) = rest.split_bottom(1);
        let current = self.current.value();

        chrome::render_tab_bar(current, frame, tabs);
        with_screen!(&self.screen, s => s.view(frame, content));
        chrome::render_status_bar(
            &StatusBarState {
                current_screen: current,
                theme: self.theme.get(),
                render_passes: self.renders.get(),
                editing: self.captures_text(),
                hint: GLOBAL_HINT,
            },
            frame,
            status,
        );
    }

    fn take_render_request(&mut self) -> bool {
        self.scheduler.take()
    }

    fn mounted(&mut self) -> Cmd<AppMsg> {
        let mut theme = self.theme.load();
        if let Some(initial) = self.initial_theme.take() {
            theme = self.theme.set(initial);
        }
        tracing::info!(theme = theme.as_str(), "theme loaded after first paint");
        Cmd::none()
    }
}
