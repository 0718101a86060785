#![forbid(unsafe_code)]

//! Stable-callback gate.

use super::instance::Variant;
use super::prop::Callback;

/// Whether the handler identity is kept across renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackMode {
    Stable,
    Unstable,
}

impl From<Variant> for CallbackMode {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Memoized => Self::Stable,
            Variant::Plain => Self::Unstable,
        }
    }
}

/// Produces a [`Callback`] per render.
///
/// Unstable mode allocates a new closure every call. Stable mode allocates
/// once and hands back the same reference while `deps` compares equal.
#[derive(Debug)]
pub struct CallbackGate<D, M> {
    mode: CallbackMode,
    held: Option<(D, Callback<M>)>,
    created: u64,
}

impl<D: PartialEq + Clone, M> CallbackGate<D, M> {
    #[must_use]
    pub fn new(mode: CallbackMode) -> Self {
        Self {
            mode,
            held: None,
            created: 0,
        }
    }

    /// The handler for this render.
    pub fn resolve<F>(&mut self, deps: &D, f: F) -> Callback<M>
    where
        F: Fn() -> M + 'static,
    {
        if self.mode == CallbackMode::Stable {
            if let Some((held_deps, callback)) = &self.held {
                if held_deps == deps {
                    return callback.clone();
                }
            }
        }
        self.created += 1;
        let callback = Callback::new(f);
        self.held = Some((deps.clone(), callback.clone()));
        callback
    }

    #[inline]
    pub fn mode(&self) -> CallbackMode {
        self.mode
    }

    /// Closures allocated since this gate was built.
    #[inline]
    pub fn created(&self) -> u64 {
        self.created
    }
}
