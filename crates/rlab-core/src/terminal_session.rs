#![forbid(unsafe_code)]

//! Raw-mode terminal guard.
//!
//! [`TerminalSession`] turns on raw mode (plus the alternate screen and
//! bracketed paste when asked) and undoes all of it on drop. A panic hook
//! runs the same restore so a crash never strands the shell in raw mode.

use std::io::{self, Write};
use std::sync::Once;
use std::time::Duration;

use crossterm::{cursor, event as cte, execute, terminal};

use crate::event::Event;

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    pub alternate_screen: bool,
    /// Deliver pastes as a single [`Event::Paste`].
    pub bracketed_paste: bool,
}

/// Owns raw mode for its lifetime. Create at most one.
#[derive(Debug)]
pub struct TerminalSession {
    options: SessionOptions,
}

impl TerminalSession {
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        static PANIC_HOOK: Once = Once::new();
        PANIC_HOOK.call_once(|| {
            let previous = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                restore(SessionOptions {
                    alternate_screen: true,
                    bracketed_paste: true,
                });
                previous(info);
            }));
        });

        terminal::enable_raw_mode()?;
        // From here on, drop restores whatever was switched on.
        let session = Self { options };
        let mut out = io::stdout();
        if options.alternate_screen {
            execute!(out, terminal::EnterAlternateScreen)?;
        }
        if options.bracketed_paste {
            execute!(out, cte::EnableBracketedPaste)?;
        }
        execute!(out, cursor::Hide)?;
        crate::info!(
            alternate_screen = options.alternate_screen,
            bracketed_paste = options.bracketed_paste,
            "terminal session started"
        );
        Ok(session)
    }

    /// Current (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Wait up to `timeout` for input. `Ok(false)` on timeout.
    pub fn poll_event(&self, timeout: Duration) -> io::Result<bool> {
        cte::poll(timeout)
    }

    /// Block for the next input. `Ok(None)` for input that has no [`Event`].
    pub fn read_event(&self) -> io::Result<Option<Event>> {
        cte::read().map(Event::from_crossterm)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        restore(self.options);
        crate::info!("terminal session restored");
    }
}

/// Undo session modes in reverse order. Errors are ignored; there is no
/// better terminal to report them to.
fn restore(options: SessionOptions) {
    let mut out = io::stdout();
    if options.bracketed_paste {
        let _ = execute!(out, cte::DisableBracketedPaste);
    }
    let _ = execute!(out, cursor::Show);
    if options.alternate_screen {
        let _ = execute!(out, terminal::LeaveAlternateScreen);
    }
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
