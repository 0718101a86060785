#![forbid(unsafe_code)]

//! Reactive state and the render scheduler it signals.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Shared render-request flag.
///
/// Every [`State`] created from the same scheduler signals it. The runtime
/// drains it once per update via [`take`](Self::take), so any number of
/// `set`s during one update coalesce into a single render pass.
#[derive(Clone, Default)]
pub struct RenderScheduler {
    inner: Rc<SchedulerInner>,
}

#[derive(Default)]
struct SchedulerInner {
    pending: Cell<bool>,
    requests: Cell<u64>,
}

impl RenderScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a render pass.
    pub fn request(&self) {
        self.inner.pending.set(true);
        self.inner.requests.set(self.inner.requests.get() + 1);
    }

    /// Consume the pending request, returning whether there was one.
    pub fn take(&self) -> bool {
        self.inner.pending.replace(false)
    }

    /// Whether a render is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.pending.get()
    }

    /// Total requests made since creation, before coalescing.
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.inner.requests.get()
    }
}

impl fmt::Debug for RenderScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderScheduler")
            .field("pending", &self.is_pending())
            .field("requests", &self.request_count())
            .finish()
    }
}

/// A reactive value.
///
/// [`set`](Self::set) stores the value and requests a render when it differs
/// from the current one; setting an equal value requests nothing.
pub struct State<T> {
    value: T,
    scheduler: RenderScheduler,
}

impl<T: PartialEq> State<T> {
    /// Create state bound to `scheduler`. Creation never requests a render.
    pub fn new(value: T, scheduler: &RenderScheduler) -> Self {
        Self {
            value,
            scheduler: scheduler.clone(),
        }
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value. Returns `true` if it changed (and a render was requested).
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        self.scheduler.request();
        true
    }

    /// Derive the next value from the current one.
    pub fn update(&mut self, f: impl FnOnce(&T) -> T) -> bool {
        let next = f(&self.value);
        self.set(next)
    }
}

impl<T: Copy + PartialEq> State<T> {
    /// Copy out the current value.
    #[inline]
    pub fn value(&self) -> T {
        self.value
    }
}

impl State<bool> {
    /// Flip a boolean state. Always requests a render.
    pub fn toggle(&mut self) -> bool {
        let next = !self.value;
        self.set(next);
        next
    }
}

impl State<String> {
    /// Append a character.
    pub fn push(&mut self, c: char) {
        self.value.push(c);
        self.scheduler.request();
    }

    /// Remove the last character, requesting a render only if one was removed.
    pub fn pop(&mut self) -> Option<char> {
        let popped = self.value.pop();
        if popped.is_some() {
            self.scheduler.request();
        }
        popped
    }
}

impl<T: fmt::Debug> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("State").field(&self.value).finish()
    }
}
