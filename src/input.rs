//! Keyboard and mouse handling.
//!
//! Every handler runs to completion on the event loop thread and only
//! touches state through [`App`]. Commands are queued, not run here.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::App;
use crate::error::AppResult;
use crate::pane::{Pane, PaneId};
use crate::runner::Invocation;
use crate::tokenizer::tokenize;

/// Fixed text at the start of the input line.
pub const PROMPT: &str = "git > ";
/// First editable column of the input line.
pub const PROMPT_COLUMN: u16 = PROMPT.len() as u16;

/// Whether the event loop should keep running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Put the input pane back to a bare prompt with the cursor after it.
pub fn reset_prompt(pane: &mut Pane) {
    pane.clear();
    pane.writeln(PROMPT);
    pane.set_cursor(PROMPT_COLUMN, 0);
}

/// Turn a submitted input line into an invocation. Lines using the prompt
/// convention run through `executable`; anything else names its own program.
pub fn parse_command_line(line: &str, executable: &str) -> Invocation {
    let line = line.trim();
    match line.strip_prefix(PROMPT.trim_end()) {
        Some(rest) => Invocation::classify(Some(executable), tokenize(rest)),
        None => Invocation::classify(None, tokenize(line)),
    }
}

pub fn handle_key_event(app: &mut App, key: KeyEvent) -> AppResult<Flow> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return Ok(Flow::Quit);
        }
        KeyCode::Down => scroll_log(app, 1)?,
        KeyCode::Up => scroll_log(app, -1)?,
        // The input line is append-only; horizontal movement is disabled.
        KeyCode::Left | KeyCode::Right => {}
        KeyCode::Enter => submit(app)?,
        KeyCode::Backspace => backspace(app)?,
        KeyCode::Char('h') if key.modifiers.contains(KeyModifiers::CONTROL) => backspace(app)?,
        KeyCode::Char(ch)
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT) =>
        {
            app.registry.set_current(PaneId::Terminal)?;
            app.registry.get_mut(PaneId::Terminal)?.insert_char(ch);
        }
        _ => {}
    }
    Ok(Flow::Continue)
}

pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) -> AppResult<Flow> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => click(app, mouse.column, mouse.row)?,
        // Reserved.
        MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {}
        _ => {}
    }
    Ok(Flow::Continue)
}

fn scroll_log(app: &mut App, delta: i32) -> AppResult<()> {
    let log = app.registry.get_mut(PaneId::Log)?;
    let origin = log.origin();
    let y = if delta < 0 {
        origin.y.saturating_sub(delta.unsigned_abs() as u16)
    } else {
        origin.y.saturating_add(delta as u16)
    };
    log.set_origin(origin.x, y);
    Ok(())
}

fn backspace(app: &mut App) -> AppResult<()> {
    app.registry.set_current(PaneId::Terminal)?;
    let terminal = app.registry.get_mut(PaneId::Terminal)?;
    if terminal.cursor().x > PROMPT_COLUMN {
        terminal.delete_left();
    }
    Ok(())
}

fn submit(app: &mut App) -> AppResult<()> {
    app.registry.set_current(PaneId::Terminal)?;
    let terminal = app.registry.get_mut(PaneId::Terminal)?;
    let line = terminal.buffer().trim().to_string();
    reset_prompt(terminal);

    app.registry.get_mut(PaneId::Summary)?.set_cursor(0, 0);

    match parse_command_line(&line, &app.executable) {
        Invocation::Empty => {}
        Invocation::Clear => {
            tracing::debug!("summary cleared");
            app.registry.get_mut(PaneId::Summary)?.clear();
        }
        Invocation::Exec(tokens) => {
            let directory = app.session.working_directory();
            tracing::info!(?tokens, dir = %directory.display(), "command submitted");
            app.jobs
                .push(&app.registry, PaneId::Summary, directory, tokens)?;
        }
    }
    Ok(())
}

fn click(app: &mut App, column: u16, row: u16) -> AppResult<()> {
    match app.registry.pane_at(column, row) {
        Some(PaneId::Repositories) => {
            app.registry.set_current(PaneId::Repositories)?;
            let pane = app.registry.get_mut(PaneId::Repositories)?;
            let top = pane.rect.y + 1;
            if row < top || row >= top + pane.visible_rows() {
                return Ok(());
            }
            let line_y = pane.origin().y + (row - top);
            let Some(name) = pane.line(line_y as usize).map(str::to_string) else {
                return Ok(());
            };
            pane.set_cursor(0, row - top);
            app.select(&name)?;
        }
        other => {
            reset_prompt(app.registry.get_mut(PaneId::Terminal)?);
            app.registry.set_current(other.unwrap_or(PaneId::Terminal))?;
        }
    }
    Ok(())
}
