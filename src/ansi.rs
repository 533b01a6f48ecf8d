//! Colored command output.
//!
//! Captured output may carry SGR sequences (the log query forces
//! `color.ui=always`). Each line is fed through a one-row `vt100` screen and
//! read back as styled spans; any other escape sequence is swallowed.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

const ESC: char = '\x1b';

/// Convert one line of captured output into styled spans. Text without an
/// escape character is returned as a single raw span.
pub fn to_line(text: &str) -> Line<'static> {
    if !text.contains(ESC) {
        return Line::raw(text.to_string());
    }

    let tabs = text.matches('\t').count();
    let cols = (text.len() + tabs * 8).clamp(1, u16::MAX as usize) as u16;
    let mut parser = vt100::Parser::new(1, cols, 0);
    parser.process(text.as_bytes());
    let screen = parser.screen();

    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut buf = String::new();
    let mut style = Style::default();
    // Trailing blank cells are not part of the line.
    let mut pending_blanks = String::new();

    for col in 0..cols {
        let Some(cell) = screen.cell(0, col) else {
            break;
        };
        if cell.is_wide_continuation() {
            continue;
        }
        let contents = cell.contents();
        let cell_style = cell_style(cell);
        if contents.is_empty() {
            pending_blanks.push(' ');
            continue;
        }
        if cell_style != style && !(buf.is_empty() && pending_blanks.is_empty()) {
            buf.push_str(&pending_blanks);
            pending_blanks.clear();
            spans.push(Span::styled(std::mem::take(&mut buf), style));
        }
        buf.push_str(&pending_blanks);
        pending_blanks.clear();
        style = cell_style;
        buf.push_str(&contents);
    }
    if !buf.is_empty() {
        spans.push(Span::styled(buf, style));
    }

    Line::from(spans)
}

fn cell_style(cell: &vt100::Cell) -> Style {
    let mut style = Style::default();
    if let Some(fg) = map_color(cell.fgcolor()) {
        style = style.fg(fg);
    }
    if let Some(bg) = map_color(cell.bgcolor()) {
        style = style.bg(bg);
    }
    if cell.bold() {
        style = style.add_modifier(Modifier::BOLD);
    }
    if cell.italic() {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if cell.underline() {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if cell.inverse() {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}

fn map_color(color: vt100::Color) -> Option<Color> {
    match color {
        vt100::Color::Default => None,
        vt100::Color::Idx(i) => Some(idx_to_color(i)),
        vt100::Color::Rgb(r, g, b) => Some(Color::Rgb(r, g, b)),
    }
}

fn idx_to_color(idx: u8) -> Color {
    match idx {
        0 => Color::Black,
        1 => Color::Red,
        2 => Color::Green,
        3 => Color::Yellow,
        4 => Color::Blue,
        5 => Color::Magenta,
        6 => Color::Cyan,
        7 => Color::White,
        8 => Color::DarkGray,
        9 => Color::LightRed,
        10 => Color::LightGreen,
        11 => Color::LightYellow,
        12 => Color::LightBlue,
        13 => Color::LightMagenta,
        14 => Color::LightCyan,
        15 => Color::Gray,
        n => Color::Indexed(n),
    }
}
