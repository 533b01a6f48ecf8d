//! Frame rendering for the pane registry.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthChar;

use crate::ansi;
use crate::app::App;
use crate::layout::{self, MIN_HEIGHT, MIN_WIDTH};
use crate::pane::{Pane, PaneId};

const FOCUS_COLOR: Color = Color::Cyan;
const BORDER_COLOR: Color = Color::DarkGray;
const SELECTION_BG: Color = Color::Green;

/// Render every pane, the cursor of the input line and the footer. Draws a
/// notice instead when the terminal is below the minimum size.
pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    if app.too_small || app.registry.is_empty() {
        let msg = format!(
            "Terminal too small ({}x{}, need {}x{})",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let top = area.height / 2;
        f.render_widget(
            Paragraph::new(msg)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            Rect::new(area.x, area.y + top, area.width, area.height - top),
        );
        return;
    }

    let focused = app.registry.current();
    for pane in app.registry.iter() {
        draw_pane(f, app, pane, pane.id == focused);
    }

    if focused == PaneId::Terminal {
        if let Ok(terminal) = app.registry.get(PaneId::Terminal) {
            place_cursor(f, terminal);
        }
    }

    if let Ok(rects) = layout::compute(&app.layout.params, area.width, area.height) {
        draw_footer(f, app, rects.footer);
    }
}

fn draw_pane(f: &mut Frame, app: &App, pane: &Pane, focused: bool) {
    let border = if focused { FOCUS_COLOR } else { BORDER_COLOR };
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    if let Some(title) = &pane.title {
        block = block.title(format!(" {title} "));
    }
    let inner = block.inner(pane.rect);
    f.render_widget(block, pane.rect);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let selected = pane.highlight_selection
        && (focused || app.session.current_repository.is_some());
    let selected_line = pane.origin().y as usize + pane.cursor().y as usize;

    let lines: Vec<Line> = pane
        .lines()
        .enumerate()
        .map(|(i, text)| {
            let line = ansi::to_line(text);
            if selected && i == selected_line {
                line.style(
                    Style::default()
                        .bg(SELECTION_BG)
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                line
            }
        })
        .collect();

    let scroll_y = if pane.autoscroll {
        (pane.line_count() as u16).saturating_sub(inner.height)
    } else {
        pane.origin().y
    };

    let mut paragraph = Paragraph::new(lines).scroll((scroll_y, pane.origin().x));
    if pane.wrap {
        paragraph = paragraph.wrap(Wrap { trim: false });
    }
    f.render_widget(paragraph, inner);
}

fn place_cursor(f: &mut Frame, pane: &Pane) {
    let inner = Block::default().borders(Borders::ALL).inner(pane.rect);
    let cursor = pane.cursor();
    let line = pane.cursor_line().unwrap_or_default();
    let col: usize = line
        .chars()
        .take(cursor.x as usize)
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum::<usize>()
        + (cursor.x as usize).saturating_sub(line.chars().count());
    let x = inner.x.saturating_add(col as u16);
    let y = inner.y.saturating_add(cursor.y);
    if x < inner.right() && y < inner.bottom() {
        f.set_cursor_position((x, y));
    }
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let key = Style::default().fg(FOCUS_COLOR).add_modifier(Modifier::BOLD);
    let mut spans = vec![
        Span::styled(" Enter", key),
        Span::raw(" run  "),
        Span::styled("↑/↓", key),
        Span::raw(" scroll log  "),
        Span::styled("Click", key),
        Span::raw(" select repository  "),
        Span::styled("Ctrl+C", key),
        Span::raw(" quit"),
    ];
    if let Some(repo) = &app.session.current_repository {
        spans.push(Span::styled(
            format!("   {}", repo.path.display()),
            Style::default().fg(BORDER_COLOR),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
