#![forbid(unsafe_code)]

//! Landing page: one card per playground.
//!
//! The overview holds no reactive state. Cards are opened with the global
//! number keys, so `update` consumes nothing.

use std::convert::Infallible;

use rlab_core::event::Event;
use rlab_core::geometry::{Rect, Sides};
use rlab_render::cell::StyleFlags;
use rlab_render::drawing::{BorderChars, Draw};
use rlab_render::frame::Frame;
use rlab_render::style::Style;
use rlab_runtime::hooks::RenderCx;
use rlab_runtime::program::Cmd;

use super::{KeyHint, Screen};
use crate::app::ScreenId;
use crate::chrome;
use crate::theme;

const KEYS: &[KeyHint] = &[("1-3", "open a playground")];

const HEADING: &str = "Render optimization";
const SUBHEADING: &str = "Interactive playgrounds for skipping unnecessary render work";

/// One overview card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub screen: ScreenId,
    pub description: &'static str,
}

/// The cards, in tab order.
pub const CARDS: [Card; 3] = [
    Card {
        screen: ScreenId::Memo,
        description: "How memoizing a component skips its render when the props are \
                      unchanged, and where that stops working.",
    },
    Card {
        screen: ScreenId::Callback,
        description: "How a stable handler reference lets a memoized child ignore \
                      renders of its parent.",
    },
    Card {
        screen: ScreenId::Computation,
        description: "How caching an expensive computation on its dependency skips the \
                      work while the component still renders.",
    },
];

/// The overview screen.
#[derive(Debug, Default)]
pub struct Overview;

impl Overview {
    pub fn new() -> Self {
        Self
    }
}

impl Screen for Overview {
    type Message = Infallible;

    fn update(&mut self, _event: &Event) -> Cmd<Infallible> {
        Cmd::none()
    }

    fn handle_message(&mut self, msg: Infallible) -> Cmd<Infallible> {
        match msg {}
    }

    fn render(&mut self, _cx: &RenderCx) {}

    fn view(&self, frame: &mut Frame, area: Rect) {
        let palette = theme::palette();
        if area.height < 4 {
            return;
        }
        let body = area.inner(Sides::horizontal(2));
        frame.buffer.print_text_clipped(
            body.x,
            area.y + 1,
            HEADING,
            Style::new().fg(palette.accent).attrs(StyleFlags::BOLD),
            body.right(),
        );
        frame.buffer.print_text_clipped(
            body.x,
            area.y + 2,
            SUBHEADING,
            Style::new().fg(palette.muted),
            body.right(),
        );

        let (_, cards) = body.split_top(4);
        let columns = cards.split_columns(&[1, 1, 1]);
        let text = Style::new().fg(palette.fg);
        for (card, rect) in CARDS.iter().zip(columns) {
            let title = format!("{}: {}", card.screen.number(), card.screen.title());
            frame
                .buffer
                .draw_border(rect, BorderChars::ROUNDED, palette.border(), Some(title.as_str()));
            let inner = rect.inner(Sides::all(1)).inner(Sides::horizontal(1));
            let lines = chrome::wrap_words(card.description, usize::from(inner.width));
            for (y, line) in (inner.y..inner.bottom()).zip(&lines) {
                frame
                    .buffer
                    .print_text_clipped(inner.x, y, line, text, inner.right());
            }
            if inner.height > 0 {
                let hint = format!("press {} to open", card.screen.number());
                frame.buffer.print_text_clipped(
                    inner.x,
                    inner.bottom() - 1,
                    &hint,
                    Style::new().fg(palette.muted),
                    inner.right(),
                );
            }
        }
    }

    fn keybindings(&self) -> &'static [KeyHint] {
        KEYS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{LIGHT, with_palette};

    #[test]
    fn cards_cover_every_playground_in_tab_order() {
        let screens: Vec<ScreenId> = CARDS.iter().map(|c| c.screen).collect();
        let playgrounds: Vec<ScreenId> = ScreenId::ALL
            .into_iter()
            .filter(|id| *id != ScreenId::Home)
            .collect();
        assert_eq!(screens, playgrounds);
    }

    #[test]
    fn view_draws_a_titled_card_per_playground() {
        let mut frame = Frame::new(120, 16);
        let area = frame.area();
        with_palette(LIGHT, || Overview::new().view(&mut frame, area));
        let text = frame.buffer.to_text();
        assert!(text.contains(HEADING), "{text}");
        for card in CARDS {
            assert!(text.contains(card.screen.title()), "{text}");
            assert!(text.contains(&format!("press {}", card.screen.number())), "{text}");
        }
    }
}
