//! Named screen regions and their per-pane state.
//!
//! Panes are created by the layout pass and owned by [`PaneRegistry`]; every
//! mutation (clear, append, cursor, origin) goes through the registry so the
//! event loop is the only writer.

use std::fmt;

use ratatui::layout::{Position, Rect};

use crate::error::{AppError, AppResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PaneId {
    Repositories,
    Summary,
    SelectedRepository,
    CurrentBranch,
    Log,
    Terminal,
}

impl PaneId {
    pub const ALL: [PaneId; 6] = [
        PaneId::Repositories,
        PaneId::Summary,
        PaneId::SelectedRepository,
        PaneId::CurrentBranch,
        PaneId::Log,
        PaneId::Terminal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaneId::Repositories => "repositories",
            PaneId::Summary => "summary",
            PaneId::SelectedRepository => "selected_repository",
            PaneId::CurrentBranch => "current_branch",
            PaneId::Log => "log",
            PaneId::Terminal => "terminal",
        }
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct Pane {
    pub id: PaneId,
    pub rect: Rect,
    pub title: Option<String>,
    pub editable: bool,
    pub autoscroll: bool,
    pub wrap: bool,
    pub highlight_selection: bool,
    /// Label panes: command output is reduced to its first line.
    pub single_line: bool,
    content: String,
    cursor: Position,
    origin: Position,
    generation: u64,
}

impl Pane {
    pub fn new(id: PaneId, rect: Rect) -> Self {
        Self {
            id,
            rect,
            title: None,
            editable: false,
            autoscroll: false,
            wrap: false,
            highlight_selection: false,
            single_line: false,
            content: String::new(),
            cursor: Position::ORIGIN,
            origin: Position::ORIGIN,
            generation: 0,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.content
    }

    /// Drop all content. Bumps the generation so in-flight output aimed at
    /// the old content can be recognised and discarded.
    pub fn clear(&mut self) {
        self.content.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn write(&mut self, text: &str) {
        self.content.push_str(text);
    }

    pub fn writeln(&mut self, text: &str) {
        self.content.push_str(text);
        self.content.push('\n');
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.lines()
    }

    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }

    pub fn line(&self, y: usize) -> Option<&str> {
        self.content.lines().nth(y)
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn set_cursor(&mut self, x: u16, y: u16) {
        self.cursor = Position::new(x, y);
    }

    pub fn origin(&self) -> Position {
        self.origin
    }

    pub fn set_origin(&mut self, x: u16, y: u16) {
        self.origin = Position::new(x, y);
    }

    /// Rows of content visible inside the border.
    pub fn visible_rows(&self) -> u16 {
        self.rect.height.saturating_sub(2).max(1)
    }

    /// Put the cursor on content line `y`, scrolling just enough to show it.
    pub fn reveal_line(&mut self, y: u16) {
        let rows = self.visible_rows();
        if y < self.origin.y {
            self.origin.y = y;
        } else if y >= self.origin.y + rows {
            self.origin.y = y + 1 - rows;
        }
        self.cursor = Position::new(0, y - self.origin.y);
    }

    /// Line under the cursor, relative to the scroll origin.
    pub fn cursor_line(&self) -> Option<&str> {
        self.line(self.origin.y as usize + self.cursor.y as usize)
    }

    /// Insert `ch` at the cursor, padding the line with spaces if the cursor
    /// sits past its end.
    pub fn insert_char(&mut self, ch: char) {
        let (start, end) = self.ensure_line(self.cursor.y as usize);
        let line = &self.content[start..end];
        let len = line.chars().count();
        let col = self.cursor.x as usize;
        if col > len {
            self.content.insert_str(end, &" ".repeat(col - len));
        }
        let (start, _) = self.line_span(self.cursor.y as usize);
        let byte = start + char_to_byte_index(&self.content[start..], col);
        self.content.insert(byte, ch);
        self.cursor.x = self.cursor.x.saturating_add(1);
    }

    /// Delete the character left of the cursor.
    pub fn delete_left(&mut self) {
        if self.cursor.x == 0 {
            return;
        }
        let y = self.cursor.y as usize;
        let col = self.cursor.x as usize;
        if y < self.line_count() {
            let (start, end) = self.line_span(y);
            let line = &self.content[start..end];
            if col <= line.chars().count() {
                let b0 = start + char_to_byte_index(line, col - 1);
                let b1 = start + char_to_byte_index(line, col);
                self.content.replace_range(b0..b1, "");
            }
        }
        self.cursor.x -= 1;
    }

    /// Byte span of line `y`, excluding its newline. Missing lines map to an
    /// empty span at the end of the buffer.
    fn line_span(&self, y: usize) -> (usize, usize) {
        let mut start = 0usize;
        for (i, line) in self.content.split_inclusive('\n').enumerate() {
            let body = line.strip_suffix('\n').unwrap_or(line);
            if i == y {
                return (start, start + body.len());
            }
            start += line.len();
        }
        (self.content.len(), self.content.len())
    }

    fn ensure_line(&mut self, y: usize) -> (usize, usize) {
        let missing = (y + 1).saturating_sub(self.line_count().max(1));
        if missing > 0 {
            if !self.content.is_empty() && !self.content.ends_with('\n') {
                self.content.push('\n');
            }
            for _ in 1..missing {
                self.content.push('\n');
            }
        }
        self.line_span(y)
    }
}

fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or_else(|| s.len())
}

/// All panes plus the focus pointer.
#[derive(Debug)]
pub struct PaneRegistry {
    panes: Vec<Pane>,
    current: PaneId,
}

impl Default for PaneRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PaneRegistry {
    pub fn new() -> Self {
        Self {
            panes: Vec::new(),
            current: PaneId::Terminal,
        }
    }

    pub fn contains(&self, id: PaneId) -> bool {
        self.panes.iter().any(|p| p.id == id)
    }

    pub fn get(&self, id: PaneId) -> AppResult<&Pane> {
        self.panes
            .iter()
            .find(|p| p.id == id)
            .ok_or(AppError::PaneNotFound(id))
    }

    pub fn get_mut(&mut self, id: PaneId) -> AppResult<&mut Pane> {
        self.panes
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(AppError::PaneNotFound(id))
    }

    /// Create `id` at `rect`, or move an existing pane there keeping its
    /// content and cursor. Returns the pane and whether it was created.
    pub fn upsert(&mut self, id: PaneId, rect: Rect) -> (&mut Pane, bool) {
        match self.panes.iter().position(|p| p.id == id) {
            Some(idx) => {
                let pane = &mut self.panes[idx];
                pane.rect = rect;
                (pane, false)
            }
            None => {
                self.panes.push(Pane::new(id, rect));
                let idx = self.panes.len() - 1;
                (&mut self.panes[idx], true)
            }
        }
    }

    pub fn current(&self) -> PaneId {
        self.current
    }

    pub fn set_current(&mut self, id: PaneId) -> AppResult<()> {
        if !self.contains(id) {
            return Err(AppError::PaneNotFound(id));
        }
        if self.current != id {
            tracing::debug!(from = %self.current, to = %id, "focus changed");
        }
        self.current = id;
        Ok(())
    }

    /// Topmost pane whose rectangle contains the cell.
    pub fn pane_at(&self, column: u16, row: u16) -> Option<PaneId> {
        let pos = Position::new(column, row);
        self.panes
            .iter()
            .rev()
            .find(|p| p.rect.contains(pos))
            .map(|p| p.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pane> {
        self.panes.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.panes.is_empty()
    }
}
