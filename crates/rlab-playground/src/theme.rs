#![forbid(unsafe_code)]

//! Theme preference store and palette context.
//!
//! The preference is a two-phase store over a [`StateRegistry`]:
//!
//! | Phase     | `get()` returns                                   |
//! |-----------|---------------------------------------------------|
//! | `Unready` | `Light`                                           |
//! | `Ready`   | persisted value, else system preference, else `Light` |
//!
//! The app loads the store from `Model::mounted`, strictly after the first
//! paint. Every change is flushed to the backend immediately.
//!
//! Painting code reads colors through [`palette`], which requires an active
//! [`ThemeScope`]. The app installs one around each paint.

use std::cell::RefCell;
use std::env;
use std::fmt;

use rlab_render::cell::PackedRgba;
use rlab_render::style::Style;
use rlab_runtime::state_persistence::StateRegistry;

/// Storage key for the persisted preference.
pub const THEME_KEY: &str = "theme";

/// Environment variable that forces the system preference.
pub const SYSTEM_THEME_ENV: &str = "RENDERLAB_SYSTEM_THEME";

// ---------------------------------------------------------------------------
// Preference
// ---------------------------------------------------------------------------

/// The two supported themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    /// Persisted representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse the persisted representation (case-insensitive, trimmed).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("light") {
            Some(Self::Light)
        } else if raw.eq_ignore_ascii_case("dark") {
            Some(Self::Dark)
        } else {
            None
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
        }
    }

    pub const fn palette(self) -> Palette {
        match self {
            Self::Light => LIGHT,
            Self::Dark => DARK,
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// System preference
// ---------------------------------------------------------------------------

/// Detect the host's preferred theme from the environment.
///
/// `RENDERLAB_SYSTEM_THEME` wins; otherwise the background index of
/// `COLORFGBG` is consulted.
pub fn detect_system_theme() -> Option<ThemePreference> {
    let forced = env::var(SYSTEM_THEME_ENV).ok();
    let colorfgbg = env::var("COLORFGBG").ok();
    detect_system_theme_from(forced.as_deref(), colorfgbg.as_deref())
}

/// Pure form of [`detect_system_theme`].
pub fn detect_system_theme_from(
    forced: Option<&str>,
    colorfgbg: Option<&str>,
) -> Option<ThemePreference> {
    forced
        .and_then(ThemePreference::parse)
        .or_else(|| colorfgbg.and_then(theme_from_colorfgbg))
}

/// `COLORFGBG` is `fg;bg` (rxvt also emits `fg;default;bg`); only the last
/// field matters.
fn theme_from_colorfgbg(raw: &str) -> Option<ThemePreference> {
    let bg: u8 = raw.rsplit(';').next()?.trim().parse().ok()?;
    match bg {
        0..=6 | 8 => Some(ThemePreference::Dark),
        7 | 15 => Some(ThemePreference::Light),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Unready,
    Ready(ThemePreference),
}

/// Persisted theme preference.
pub struct ThemeStore {
    registry: StateRegistry,
    system: Option<ThemePreference>,
    phase: Phase,
}

impl ThemeStore {
    /// Create an unready store. `system` is the host preference used when
    /// nothing has been persisted.
    pub fn new(registry: StateRegistry, system: Option<ThemePreference>) -> Self {
        Self {
            registry,
            system,
            phase: Phase::Unready,
        }
    }

    /// Store backed by memory only.
    pub fn in_memory(system: Option<ThemePreference>) -> Self {
        Self::new(StateRegistry::in_memory(), system)
    }

    /// Resolve the preference and become ready. Later calls are no-ops.
    ///
    /// Storage failures are logged and fall back to the system preference.
    pub fn load(&mut self) -> ThemePreference {
        if let Phase::Ready(value) = self.phase {
            return value;
        }
        if let Err(err) = self.registry.load() {
            tracing::warn!(
                backend = self.registry.backend_name(),
                error = %err,
                "failed to load theme preference, using system default"
            );
        }
        let stored = self.registry.get(THEME_KEY);
        let persisted = stored.as_deref().and_then(ThemePreference::parse);
        if stored.is_some() && persisted.is_none() {
            tracing::warn!(value = ?stored, "ignoring unrecognized stored theme");
        }
        let value = persisted.or(self.system).unwrap_or_default();
        tracing::debug!(
            theme = value.as_str(),
            persisted = persisted.is_some(),
            "theme store ready"
        );
        self.phase = Phase::Ready(value);
        value
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Ready(_))
    }

    /// Current preference. `Light` until [`load`](Self::load) has run.
    pub fn get(&self) -> ThemePreference {
        match self.phase {
            Phase::Unready => ThemePreference::Light,
            Phase::Ready(value) => value,
        }
    }

    /// Set and persist the preference.
    pub fn set(&mut self, value: ThemePreference) -> ThemePreference {
        self.phase = Phase::Ready(value);
        self.registry.set(THEME_KEY, value.as_str());
        match self.registry.flush() {
            Ok(_) => tracing::debug!(theme = value.as_str(), "theme persisted"),
            Err(err) => tracing::warn!(
                backend = self.registry.backend_name(),
                error = %err,
                "failed to persist theme preference"
            ),
        }
        value
    }

    /// Flip between light and dark, persisting the result.
    pub fn toggle(&mut self) -> ThemePreference {
        self.set(self.get().toggled())
    }

    /// The host preference this store falls back to.
    pub fn system(&self) -> Option<ThemePreference> {
        self.system
    }

    /// Raw persisted value, if any.
    pub fn persisted(&self) -> Option<String> {
        self.registry.get(THEME_KEY)
    }
}

impl fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeStore")
            .field("phase", &self.phase)
            .field("system", &self.system)
            .field("backend", &self.registry.backend_name())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// Semantic colors used by the chrome and playgrounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: PackedRgba,
    pub surface: PackedRgba,
    pub border: PackedRgba,
    pub fg: PackedRgba,
    pub muted: PackedRgba,
    pub accent: PackedRgba,
    /// "Rendered" labels and render flashes.
    pub rendered: PackedRgba,
    /// "Skipped" labels.
    pub skipped: PackedRgba,
    pub code_keyword: PackedRgba,
    pub code_text: PackedRgba,
}

pub const LIGHT: Palette = Palette {
    bg: PackedRgba::rgb(250, 250, 247),
    surface: PackedRgba::rgb(236, 238, 242),
    border: PackedRgba::rgb(160, 168, 180),
    fg: PackedRgba::rgb(28, 32, 40),
    muted: PackedRgba::rgb(106, 114, 128),
    accent: PackedRgba::rgb(0, 110, 200),
    rendered: PackedRgba::rgb(200, 90, 0),
    skipped: PackedRgba::rgb(20, 140, 70),
    code_keyword: PackedRgba::rgb(150, 40, 160),
    code_text: PackedRgba::rgb(40, 48, 60),
};

pub const DARK: Palette = Palette {
    bg: PackedRgba::rgb(14, 17, 23),
    surface: PackedRgba::rgb(28, 33, 43),
    border: PackedRgba::rgb(70, 80, 96),
    fg: PackedRgba::rgb(220, 226, 235),
    muted: PackedRgba::rgb(127, 140, 158),
    accent: PackedRgba::rgb(90, 180, 255),
    rendered: PackedRgba::rgb(255, 170, 70),
    skipped: PackedRgba::rgb(90, 220, 140),
    code_keyword: PackedRgba::rgb(210, 140, 255),
    code_text: PackedRgba::rgb(200, 208, 220),
};

impl Palette {
    pub const fn base(&self) -> Style {
        Style::new().fg(self.fg).bg(self.bg)
    }

    pub const fn muted(&self) -> Style {
        Style::new().fg(self.muted).bg(self.bg)
    }

    pub const fn border(&self) -> Style {
        Style::new().fg(self.border).bg(self.bg)
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Errors from reading the theme context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// No [`ThemeScope`] is active on this thread.
    NoProvider,
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoProvider => write!(f, "theme palette read outside of a ThemeScope"),
        }
    }
}

impl std::error::Error for ContextError {}

thread_local! {
    static SCOPES: RefCell<Vec<Palette>> = const { RefCell::new(Vec::new()) };
}

/// RAII guard that makes a palette current until dropped.
///
/// Scopes nest; the innermost wins.
#[must_use = "dropping the scope removes the palette"]
pub struct ThemeScope {
    _marker: std::marker::PhantomData<*const ()>,
}

impl ThemeScope {
    pub fn enter(palette: Palette) -> Self {
        SCOPES.with(|stack| stack.borrow_mut().push(palette));
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl Drop for ThemeScope {
    fn drop(&mut self) {
        SCOPES.with(|stack| {
            if stack.borrow_mut().pop().is_none() {
                debug_assert!(false, "ThemeScope dropped but stack was empty");
            }
        });
    }
}

/// Run `f` with `palette` current.
pub fn with_palette<R>(palette: Palette, f: impl FnOnce() -> R) -> R {
    let _scope = ThemeScope::enter(palette);
    f()
}

/// The current palette, or [`ContextError::NoProvider`] outside a scope.
pub fn try_palette() -> Result<Palette, ContextError> {
    SCOPES.with(|stack| stack.borrow().last().copied().ok_or(ContextError::NoProvider))
}

/// The current palette.
///
/// Reading outside a [`ThemeScope`] is a bug: debug builds panic, release
/// builds log and fall back to [`LIGHT`].
pub fn palette() -> Palette {
    match try_palette() {
        Ok(palette) => palette,
        Err(err) => {
            debug_assert!(false, "{err}");
            tracing::warn!(error = %err, "falling back to light palette");
            LIGHT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlab_runtime::state_persistence::MemoryStorage;

    fn store_with(stored: Option<&str>, system: Option<ThemePreference>) -> ThemeStore {
        let backend = match stored {
            Some(value) => MemoryStorage::with_entries([(THEME_KEY, value)]),
            None => MemoryStorage::new(),
        };
        ThemeStore::new(StateRegistry::new(Box::new(backend)), system)
    }

    #[test]
    fn unready_store_reads_light() {
        let store = store_with(Some("dark"), Some(ThemePreference::Dark));
        assert!(!store.is_ready());
        assert_eq!(store.get(), ThemePreference::Light);
    }

    #[test]
    fn persisted_value_wins_over_system() {
        let mut store = store_with(Some("light"), Some(ThemePreference::Dark));
        assert_eq!(store.load(), ThemePreference::Light);
    }

    #[test]
    fn system_dark_then_toggle_persists_light() {
        let mut store = store_with(None, Some(ThemePreference::Dark));
        assert_eq!(store.load(), ThemePreference::Dark);
        assert_eq!(store.toggle(), ThemePreference::Light);
        assert_eq!(store.persisted().as_deref(), Some("light"));
    }

    #[test]
    fn nothing_known_defaults_to_light() {
        let mut store = store_with(None, None);
        assert_eq!(store.load(), ThemePreference::Light);
        assert_eq!(store.persisted(), None);
    }

    #[test]
    fn garbage_stored_value_falls_back_to_system() {
        let mut store = store_with(Some("sepia"), Some(ThemePreference::Dark));
        assert_eq!(store.load(), ThemePreference::Dark);
    }

    #[test]
    fn load_is_idempotent() {
        let mut store = store_with(None, Some(ThemePreference::Dark));
        store.load();
        store.set(ThemePreference::Light);
        assert_eq!(store.load(), ThemePreference::Light);
    }

    #[test]
    fn colorfgbg_background_index() {
        assert_eq!(detect_system_theme_from(None, Some("15;0")), Some(ThemePreference::Dark));
        assert_eq!(detect_system_theme_from(None, Some("0;15")), Some(ThemePreference::Light));
        assert_eq!(
            detect_system_theme_from(None, Some("0;default;7")),
            Some(ThemePreference::Light)
        );
        assert_eq!(detect_system_theme_from(None, Some("7;8")), Some(ThemePreference::Dark));
        assert_eq!(detect_system_theme_from(None, Some("0;11")), None);
        assert_eq!(detect_system_theme_from(None, Some("garbage")), None);
        assert_eq!(detect_system_theme_from(None, None), None);
    }

    #[test]
    fn forced_system_theme_wins() {
        assert_eq!(
            detect_system_theme_from(Some("DARK"), Some("0;15")),
            Some(ThemePreference::Dark)
        );
        assert_eq!(
            detect_system_theme_from(Some("nope"), Some("0;15")),
            Some(ThemePreference::Light)
        );
    }

    #[test]
    fn scopes_nest() {
        assert_eq!(try_palette(), Err(ContextError::NoProvider));
        let outer = ThemeScope::enter(LIGHT);
        assert_eq!(palette(), LIGHT);
        with_palette(DARK, || assert_eq!(palette(), DARK));
        assert_eq!(palette(), LIGHT);
        drop(outer);
        assert!(try_palette().is_err());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside of a ThemeScope")]
    fn palette_outside_scope_panics() {
        let _ = palette();
    }

    #[test]
    fn parse_round_trips_display() {
        for pref in [ThemePreference::Light, ThemePreference::Dark] {
            assert_eq!(ThemePreference::parse(&pref.to_string()), Some(pref));
        }
    }
}
