#![forbid(unsafe_code)]

//! Input events.
//!
//! The playgrounds are driven from the keyboard, so only keys, resizes,
//! paste, focus and the runtime tick are modelled. Mouse input is dropped at
//! the crossterm boundary.

use bitflags::bitflags;
use crossterm::event as cte;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Resize {
        width: u16,
        height: u16,
    },
    /// Bracketed paste, delivered as one event.
    Paste(String),
    /// Focus gained (`true`) or lost (`false`).
    Focus(bool),
    /// Runtime tick. Ticks only repaint; they never run a render pass.
    Tick,
}

impl Event {
    /// Translate a crossterm event. Returns `None` for input with no
    /// counterpart here (mouse, media keys, modifier-only presses).
    #[must_use]
    pub fn from_crossterm(event: cte::Event) -> Option<Self> {
        Some(match event {
            cte::Event::Key(key) => Event::Key(KeyEvent::from_crossterm(key)?),
            cte::Event::Resize(width, height) => Event::Resize { width, height },
            cte::Event::Paste(text) => Event::Paste(text),
            cte::Event::FocusGained => Event::Focus(true),
            cte::Event::FocusLost => Event::Focus(false),
            cte::Event::Mouse(_) => return None,
        })
    }

    #[must_use]
    pub const fn key(code: KeyCode) -> Self {
        Event::Key(KeyEvent::new(code))
    }

    #[must_use]
    pub const fn char(c: char) -> Self {
        Event::key(KeyCode::Char(c))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// An unmodified key press.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        self.code == KeyCode::Char(c)
    }

    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Presses and auto-repeats act; releases do not.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        !matches!(self.kind, KeyEventKind::Release)
    }

    fn from_crossterm(key: cte::KeyEvent) -> Option<Self> {
        let code = match key.code {
            cte::KeyCode::Char(c) => KeyCode::Char(c),
            cte::KeyCode::Enter => KeyCode::Enter,
            cte::KeyCode::Esc => KeyCode::Escape,
            cte::KeyCode::Backspace => KeyCode::Backspace,
            cte::KeyCode::Tab => KeyCode::Tab,
            cte::KeyCode::BackTab => KeyCode::BackTab,
            _ => return None,
        };
        let kind = match key.kind {
            cte::KeyEventKind::Press => KeyEventKind::Press,
            cte::KeyEventKind::Repeat => KeyEventKind::Repeat,
            cte::KeyEventKind::Release => KeyEventKind::Release,
        };
        Some(Self {
            code,
            modifiers: Modifiers::from_crossterm(key.modifiers),
            kind,
        })
    }
}

/// Keys the playgrounds react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    /// Shift-Tab.
    BackTab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const NONE  = 0;
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
        /// Super, Hyper or Meta.
        const SUPER = 1 << 3;
    }
}

impl Modifiers {
    fn from_crossterm(m: cte::KeyModifiers) -> Self {
        let mut out = Self::NONE;
        out.set(Self::SHIFT, m.contains(cte::KeyModifiers::SHIFT));
        out.set(Self::ALT, m.contains(cte::KeyModifiers::ALT));
        out.set(Self::CTRL, m.contains(cte::KeyModifiers::CONTROL));
        out.set(
            Self::SUPER,
            m.intersects(
                cte::KeyModifiers::SUPER | cte::KeyModifiers::HYPER | cte::KeyModifiers::META,
            ),
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ct_key(code: cte::KeyCode, modifiers: cte::KeyModifiers) -> Option<Event> {
        Event::from_crossterm(cte::Event::Key(cte::KeyEvent::new(code, modifiers)))
    }

    #[test]
    fn release_is_not_actionable() {
        let release = KeyEvent::new(KeyCode::Enter).with_kind(KeyEventKind::Release);
        assert!(!release.is_actionable());
        assert!(KeyEvent::new(KeyCode::Enter).is_actionable());
    }

    #[test]
    fn ctrl_c_maps_with_modifier() {
        let Some(Event::Key(key)) = ct_key(cte::KeyCode::Char('c'), cte::KeyModifiers::CONTROL)
        else {
            panic!("ctrl-c should map to a key event");
        };
        assert!(key.is_char('c'));
        assert!(key.ctrl());
        assert!(!key.modifiers.contains(Modifiers::SHIFT));
    }

    #[test]
    fn esc_and_backtab_map() {
        assert_eq!(
            ct_key(cte::KeyCode::Esc, cte::KeyModifiers::NONE),
            Some(Event::key(KeyCode::Escape))
        );
        let back = ct_key(cte::KeyCode::BackTab, cte::KeyModifiers::SHIFT);
        assert_eq!(
            back,
            Some(Event::Key(
                KeyEvent::new(KeyCode::BackTab).with_modifiers(Modifiers::SHIFT)
            ))
        );
    }

    #[test]
    fn resize_paste_and_focus_map() {
        assert_eq!(
            Event::from_crossterm(cte::Event::Resize(100, 40)),
            Some(Event::Resize {
                width: 100,
                height: 40
            })
        );
        assert_eq!(
            Event::from_crossterm(cte::Event::Paste("abc".into())),
            Some(Event::Paste("abc".into()))
        );
        assert_eq!(
            Event::from_crossterm(cte::Event::FocusLost),
            Some(Event::Focus(false))
        );
    }

    #[test]
    fn unsupported_keys_are_dropped() {
        assert_eq!(ct_key(cte::KeyCode::CapsLock, cte::KeyModifiers::NONE), None);
        assert_eq!(ct_key(cte::KeyCode::Up, cte::KeyModifiers::NONE), None);
    }

    #[test]
    fn meta_folds_into_super() {
        let Some(Event::Key(key)) = ct_key(cte::KeyCode::Char('x'), cte::KeyModifiers::META)
        else {
            panic!("meta-x should map");
        };
        assert_eq!(key.modifiers, Modifiers::SUPER);
    }
}
