#![forbid(unsafe_code)]

//! Shared UI chrome: tab bar, status bar and the three-column shell.
//!
//! Every playground is laid out the same way:
//!
//! ```text
//! ┌ Code ──────────────┐┌ Live ───────────┐┌ Stats ──────┐
//! │ sample for the     ││ parent / child  ││ counters,   │
//! │ active variant     ││ components      ││ keys, notes │
//! └────────────────────┘└─────────────────┘└─────────────┘
//! ```
//!
//! All functions here are stateless and read colors from the current
//! [`ThemeScope`](crate::theme::ThemeScope).

use rlab_core::geometry::{Rect, Sides};
use rlab_render::cell::StyleFlags;
use rlab_render::drawing::{BorderChars, Draw, clear_area};
use rlab_render::frame::Frame;
use rlab_render::style::Style;
use rlab_runtime::hooks::RenderReason;

use crate::app::ScreenId;
use crate::theme::{self, ThemePreference};

/// Column weights for code / live / stats.
pub const SHELL_WEIGHTS: [u16; 3] = [5, 4, 3];

const CODE_KEYWORDS: &[&str] = &[
    "fn", "let", "mut", "move", "if", "else", "match", "impl", "struct", "pub", "return", "use",
];

// ---------------------------------------------------------------------------
// Tab bar
// ---------------------------------------------------------------------------

/// Render the numbered route tabs.
pub fn render_tab_bar(current: ScreenId, frame: &mut Frame, area: Rect) {
    let palette = theme::palette();
    let bar = Style::new().fg(palette.muted).bg(palette.surface);
    clear_area(&mut frame.buffer, area, bar);

    let mut x = area.x;
    let max_x = area.right();
    for id in ScreenId::ALL.iter() {
        let label = format!(" {}: {} ", id.number(), id.title());
        let style = if *id == current {
            Style::new()
                .fg(palette.bg)
                .bg(palette.accent)
                .attrs(StyleFlags::BOLD)
        } else {
            bar
        };
        if x.saturating_add(rlab_render::display_width(&label) as u16) > max_x {
            break;
        }
        x = frame
            .buffer
            .print_text_clipped(x, area.y, &label, style, max_x);
        if x < max_x {
            x = frame.buffer.print_text_clipped(
                x,
                area.y,
                "│",
                bar.attrs(StyleFlags::DIM),
                max_x,
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Status bar
// ---------------------------------------------------------------------------

/// Inputs to [`render_status_bar`].
#[derive(Debug, Clone, Copy)]
pub struct StatusBarState<'a> {
    pub current_screen: ScreenId,
    pub theme: ThemePreference,
    /// Render passes run by the app shell since startup.
    pub render_passes: u64,
    /// Whether the screen is capturing typed text.
    pub editing: bool,
    pub hint: &'a str,
}

/// Render the bottom status bar: route on the left, hints in the middle,
/// theme and pass count on the right.
pub fn render_status_bar(state: &StatusBarState<'_>, frame: &mut Frame, area: Rect) {
    let palette = theme::palette();
    let bar = Style::new().fg(palette.muted).bg(palette.surface);
    clear_area(&mut frame.buffer, area, bar);

    let left = format!(" /{} ", state.current_screen.route());
    let x = frame.buffer.print_text_clipped(
        area.x,
        area.y,
        &left,
        bar.fg(palette.accent).attrs(StyleFlags::BOLD),
        area.right(),
    );

    let right = format!(
        " theme: {} │ passes: {} ",
        state.theme.as_str(),
        state.render_passes
    );
    let right_width = rlab_render::display_width(&right) as u16;
    let right_x = area.right().saturating_sub(right_width).max(x);

    let hint = if state.editing {
        "typing into filter · Esc/Enter to finish"
    } else {
        state.hint
    };
    frame
        .buffer
        .print_text_clipped(x, area.y, hint, bar, right_x.saturating_sub(1));
    frame
        .buffer
        .print_text_clipped(right_x, area.y, &right, bar, area.right());
}

// ---------------------------------------------------------------------------
// Shell
// ---------------------------------------------------------------------------

/// The three shell columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellLayout {
    pub code: Rect,
    pub live: Rect,
    pub stats: Rect,
}

/// Split `area` into the code / live / stats columns.
pub fn shell_columns(area: Rect) -> ShellLayout {
    let cols = area.split_columns(&SHELL_WEIGHTS);
    match cols.as_slice() {
        [code, live, stats] => ShellLayout {
            code: *code,
            live: *live,
            stats: *stats,
        },
        _ => ShellLayout {
            code: area,
            live: Rect::default(),
            stats: Rect::default(),
        },
    }
}

/// Draw the bordered shell and return the inner area of each column.
pub fn render_shell(frame: &mut Frame, area: Rect, code_title: &str) -> ShellLayout {
    let palette = theme::palette();
    let cols = shell_columns(area);
    let border = palette.border();
    for (rect, title) in [
        (cols.code, code_title),
        (cols.live, "Live"),
        (cols.stats, "Stats"),
    ] {
        frame
            .buffer
            .draw_border(rect, BorderChars::ROUNDED, border, Some(title));
    }
    ShellLayout {
        code: cols.code.inner(Sides::all(1)),
        live: cols.live.inner(Sides::all(1)),
        stats: cols.stats.inner(Sides::all(1)),
    }
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

/// A code sample plus the 1-based, inclusive line range to mark as the
/// optimized part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeSample {
    pub code: &'static str,
    pub highlight: Option<(usize, usize)>,
}

impl CodeSample {
    pub const fn new(code: &'static str, highlight: Option<(usize, usize)>) -> Self {
        Self { code, highlight }
    }

    /// Whether 1-based `line` falls in the highlighted range.
    pub fn is_highlighted(&self, line: usize) -> bool {
        self.highlight
            .is_some_and(|(start, end)| (start..=end).contains(&line))
    }
}

/// Draw a code sample with keyword coloring, clipped to `area`.
///
/// Highlighted lines get a gutter bar and the surface background.
pub fn render_code(frame: &mut Frame, area: Rect, sample: &CodeSample) {
    let palette = theme::palette();
    if area.width < 2 {
        return;
    }
    let gutter = Style::new().fg(palette.skipped).attrs(StyleFlags::BOLD);
    for (row, line) in sample.code.lines().enumerate() {
        let Ok(row) = u16::try_from(row) else { break };
        if row >= area.height {
            break;
        }
        let y = area.y + row;
        let marked = sample.is_highlighted(usize::from(row) + 1);
        let (text, keyword) = code_styles(marked);
        if marked {
            frame.buffer.paint_area(
                Rect::new(area.x, y, area.width, 1),
                Style::new().bg(palette.surface),
            );
            frame
                .buffer
                .print_text_clipped(area.x, y, "▎", gutter.bg(palette.surface), area.right());
        }
        let mut x = area.x + 1;
        for (token, is_word) in tokens(line) {
            let style = if is_word && CODE_KEYWORDS.contains(&token) {
                keyword
            } else {
                text
            };
            x = frame
                .buffer
                .print_text_clipped(x, y, token, style, area.right());
        }
    }
}

fn code_styles(marked: bool) -> (Style, Style) {
    let palette = theme::palette();
    let text = Style::new().fg(palette.code_text);
    let keyword = Style::new()
        .fg(palette.code_keyword)
        .attrs(StyleFlags::BOLD);
    if marked {
        (text.bg(palette.surface), keyword.bg(palette.surface))
    } else {
        (text, keyword)
    }
}

/// Split a line into alternating identifier / non-identifier runs.
fn tokens(line: &str) -> Vec<(&str, bool)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_word = None;
    for (i, c) in line.char_indices() {
        let is_word = c.is_alphanumeric() || c == '_';
        match in_word {
            Some(prev) if prev == is_word => {}
            Some(prev) => {
                out.push((&line[start..i], prev));
                start = i;
                in_word = Some(is_word);
            }
            None => in_word = Some(is_word),
        }
    }
    if let Some(prev) = in_word {
        out.push((&line[start..], prev));
    }
    out
}

/// One labelled value in the stats column.
#[derive(Debug, Clone)]
pub struct StatRow {
    pub label: &'static str,
    pub value: String,
    /// Highlight the value (e.g. a counter that just advanced).
    pub highlight: bool,
}

impl StatRow {
    pub fn new(label: &'static str, value: impl ToString) -> Self {
        Self {
            label,
            value: value.to_string(),
            highlight: false,
        }
    }

    pub fn highlighted(mut self, on: bool) -> Self {
        self.highlight = on;
        self
    }
}

/// Draw `rows` as `label  value` pairs, then the key hints below them.
///
/// Returns the part of `area` left below the key hints.
pub fn render_stats(
    frame: &mut Frame,
    area: Rect,
    rows: &[StatRow],
    keys: &[(&str, &str)],
) -> Rect {
    let palette = theme::palette();
    let label_style = Style::new().fg(palette.muted);
    let mut y = area.y;
    for row in rows {
        if y >= area.bottom() {
            return below(area, y);
        }
        let x = frame
            .buffer
            .print_text_clipped(area.x, y, row.label, label_style, area.right());
        let value_style = if row.highlight {
            Style::new().fg(palette.rendered).attrs(StyleFlags::BOLD)
        } else {
            Style::new().fg(palette.fg)
        };
        let value_x = x.saturating_add(1).max(area.x + area.width / 2);
        frame
            .buffer
            .print_text_clipped(value_x, y, &row.value, value_style, area.right());
        y += 1;
    }

    y = y.saturating_add(1);
    for (key, action) in keys {
        if y >= area.bottom() {
            return below(area, y);
        }
        let x = frame.buffer.print_text_clipped(
            area.x,
            y,
            key,
            Style::new().fg(palette.accent).attrs(StyleFlags::BOLD),
            area.right(),
        );
        frame
            .buffer
            .print_text_clipped(x + 1, y, action, label_style, area.right());
        y += 1;
    }
    below(area, y.saturating_add(1))
}

/// The rows of `area` from `y` down.
fn below(area: Rect, y: u16) -> Rect {
    let y = y.clamp(area.y, area.bottom());
    Rect::new(area.x, y, area.width, area.bottom() - y)
}

/// Explanation shown under the stats: steps to try and what the current
/// variant does.
#[derive(Debug, Clone, Copy)]
pub struct Notes {
    pub how_to_test: &'static [&'static str],
    pub behavior: &'static str,
    /// An extra `(heading, text)` section, drawn last.
    pub caveat: Option<(&'static str, &'static str)>,
}

/// Draw `notes` word-wrapped into `area`, dropping whatever does not fit.
pub fn render_notes(frame: &mut Frame, area: Rect, notes: &Notes) {
    let palette = theme::palette();
    let heading = Style::new().fg(palette.accent).attrs(StyleFlags::BOLD);
    let body = Style::new().fg(palette.muted);

    let mut lines: Vec<(String, Style)> = vec![("How to test".to_owned(), heading)];
    for (i, step) in notes.how_to_test.iter().enumerate() {
        let prefix = format!("{}. ", i + 1);
        let indent = " ".repeat(prefix.len());
        for (j, line) in wrap_words(step, usize::from(area.width).saturating_sub(prefix.len()))
            .into_iter()
            .enumerate()
        {
            let lead = if j == 0 { &prefix } else { &indent };
            lines.push((format!("{lead}{line}"), body));
        }
    }
    lines.push((String::new(), body));
    lines.push(("Current behavior".to_owned(), heading));
    for line in wrap_words(notes.behavior, usize::from(area.width)) {
        lines.push((line, Style::new().fg(palette.fg)));
    }
    if let Some((title, text)) = notes.caveat {
        lines.push((String::new(), body));
        for line in wrap_words(title, usize::from(area.width)) {
            lines.push((line, heading));
        }
        for line in wrap_words(text, usize::from(area.width)) {
            lines.push((line, body));
        }
    }

    for (y, (line, style)) in (area.y..area.bottom()).zip(&lines) {
        frame
            .buffer
            .print_text_clipped(area.x, y, line, *style, area.right());
    }
}

/// Greedy word wrap to `width` columns. Words wider than `width` are left
/// whole for the caller to clip.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut line = String::new();
    let mut used = 0;
    for word in text.split_whitespace() {
        let w = rlab_render::display_width(word);
        if used > 0 && used + 1 + w > width {
            out.push(std::mem::take(&mut line));
            used = 0;
        }
        if used > 0 {
            line.push(' ');
            used += 1;
        }
        line.push_str(word);
        used += w;
    }
    if !line.is_empty() {
        out.push(line);
    }
    out
}

/// Draw a component box. The border takes the "rendered" color while
/// `flashing`. Returns the inner area.
pub fn render_component_box(frame: &mut Frame, rect: Rect, title: &str, flashing: bool) -> Rect {
    let palette = theme::palette();
    let (chars, style) = if flashing {
        (
            BorderChars::HEAVY,
            Style::new().fg(palette.rendered).attrs(StyleFlags::BOLD),
        )
    } else {
        (BorderChars::SQUARE, Style::new().fg(palette.border))
    };
    frame.buffer.draw_border(rect, chars, style, Some(title));
    rect.inner(Sides::all(1))
}

/// Style for a render-reason label.
pub fn reason_style(reason: RenderReason) -> Style {
    let palette = theme::palette();
    match reason {
        RenderReason::SkippedByMemo => Style::new().fg(palette.skipped).attrs(StyleFlags::BOLD),
        RenderReason::PropsChanged | RenderReason::ParentRendered => {
            Style::new().fg(palette.rendered).attrs(StyleFlags::BOLD)
        }
        RenderReason::FirstRender | RenderReason::Idle => Style::new().fg(palette.muted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{DARK, with_palette};

    #[test]
    fn shell_columns_tile_the_area() {
        let layout = shell_columns(Rect::new(0, 1, 120, 30));
        assert_eq!(layout.code, Rect::new(0, 1, 50, 30));
        assert_eq!(layout.live, Rect::new(50, 1, 40, 30));
        assert_eq!(layout.stats, Rect::new(90, 1, 30, 30));
    }

    #[test]
    fn shell_columns_absorb_remainder_in_stats() {
        let layout = shell_columns(Rect::new(0, 0, 80, 10));
        assert_eq!(layout.code.width, 33);
        assert_eq!(layout.live.width, 26);
        assert_eq!(layout.stats.width, 21);
        assert_eq!(layout.stats.right(), 80);
    }

    #[test]
    fn shell_renders_three_titled_panels() {
        let mut frame = Frame::new(60, 6);
        let area = frame.area();
        with_palette(DARK, || {
            render_shell(&mut frame, area, "Code");
        });
        let top = frame.buffer.row_text(0);
        assert!(top.contains(" Code "));
        assert!(top.contains(" Live "));
        assert!(top.contains(" Stats "));
    }

    #[test]
    fn tab_bar_lists_routes_in_order() {
        let mut frame = Frame::new(100, 1);
        let area = frame.area();
        with_palette(DARK, || render_tab_bar(ScreenId::Callback, &mut frame, area));
        let text = frame.buffer.row_text(0);
        let home = text.find("0: Overview").expect("tab 0");
        let memo = text.find("1: ").expect("tab 1");
        let callback = text.find("2: ").expect("tab 2");
        let cache = text.find("3: ").expect("tab 3");
        assert!(home < memo && memo < callback && callback < cache, "{text}");
    }

    #[test]
    fn tokens_split_words_and_punctuation() {
        let toks = tokens("let x = f(a_b);");
        let words: Vec<&str> = toks.iter().filter(|t| t.1).map(|t| t.0).collect();
        assert_eq!(words, vec!["let", "x", "f", "a_b"]);
        let joined: String = toks.iter().map(|t| t.0).collect();
        assert_eq!(joined, "let x = f(a_b);");
    }

    #[test]
    fn stats_render_labels_and_keys() {
        let mut frame = Frame::new(30, 6);
        let area = frame.area();
        with_palette(DARK, || {
            render_stats(
                &mut frame,
                area,
                &[StatRow::new("renders", 3)],
                &[("m", "toggle memo")],
            );
        });
        assert!(frame.buffer.row_text(0).starts_with("renders"));
        assert!(frame.buffer.row_text(0).contains('3'));
        assert_eq!(frame.buffer.row_text(2).trim_end(), "m toggle memo");
    }

    #[test]
    fn stats_hand_back_the_space_below() {
        let mut frame = Frame::new(30, 10);
        let area = frame.area();
        let rest = with_palette(DARK, || {
            render_stats(&mut frame, area, &[StatRow::new("a", 1)], &[("m", "memo")])
        });
        assert_eq!(rest, Rect::new(0, 4, 30, 6));

        let tiny = Rect::new(0, 0, 30, 1);
        let rest = with_palette(DARK, || {
            render_stats(&mut frame, tiny, &[StatRow::new("a", 1), StatRow::new("b", 2)], &[])
        });
        assert!(rest.is_empty());
    }

    #[test]
    fn highlighted_code_lines_get_a_gutter_bar() {
        let sample = CodeSample::new("let a = 1;\nlet b = 2;\nlet c = 3;", Some((2, 3)));
        assert!(!sample.is_highlighted(1));
        assert!(sample.is_highlighted(3));
        assert!(!sample.is_highlighted(4));

        let mut frame = Frame::new(20, 3);
        let area = frame.area();
        with_palette(DARK, || render_code(&mut frame, area, &sample));
        assert_eq!(frame.buffer.row_text(0).trim_end(), " let a = 1;");
        assert_eq!(frame.buffer.row_text(1).trim_end(), "▎let b = 2;");
        let marked = frame.buffer.get(15, 2).copied().unwrap_or_default();
        assert_eq!(marked.bg, DARK.surface);
        let plain = frame.buffer.get(15, 0).copied().unwrap_or_default();
        assert_ne!(plain.bg, DARK.surface);
    }

    #[test]
    fn words_wrap_at_width() {
        assert_eq!(
            wrap_words("the child skips the render", 10),
            vec!["the child", "skips the", "render"]
        );
        assert_eq!(wrap_words("overlong", 4), vec!["overlong"]);
        assert!(wrap_words("   ", 8).is_empty());
    }

    #[test]
    fn notes_number_steps_and_wrap_behavior() {
        let notes = Notes {
            how_to_test: &["press plus", "toggle"],
            behavior: "child renders with parent",
            caveat: Some(("Caveat", "closures")),
        };
        let mut frame = Frame::new(14, 11);
        let area = frame.area();
        with_palette(DARK, || render_notes(&mut frame, area, &notes));
        let rows: Vec<String> = (0..11)
            .map(|y| frame.buffer.row_text(y).trim_end().to_owned())
            .collect();
        assert_eq!(
            rows,
            vec![
                "How to test",
                "1. press plus",
                "2. toggle",
                "",
                "Current behavi",
                "child renders",
                "with parent",
                "",
                "Caveat",
                "closures",
                "",
            ]
        );
    }
}
