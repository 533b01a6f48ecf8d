//! Screen partitioning for the six dashboard panes.
//!
//! ```text
//! +--------------+-------------------------------+
//! |              | Summary                       |
//! | Repositories +---------------+---------------+
//! |              | Repository:   | Current branch|
//! |              +---------------+---------------+
//! |              | Log                           |
//! |              +-------------------------------+
//! |              | Terminal                      |
//! +--------------+-------------------------------+
//!  footer
//! ```

use ratatui::layout::Rect;

use crate::config::Configuration;
use crate::error::{AppError, AppResult};
use crate::input;
use crate::pane::{PaneId, PaneRegistry};

pub const MIN_WIDTH: u16 = 40;
pub const MIN_HEIGHT: u16 = 16;

pub const REPOSITORIES_TITLE: &str = "Repositories";
pub const SUMMARY_TITLE: &str = "Summary";
pub const LOG_TITLE: &str = "Log";
pub const TERMINAL_TITLE: &str = "Terminal";
pub const SELECTED_REPOSITORY_PREFIX: &str = "Repository: ";
pub const CURRENT_BRANCH_PREFIX: &str = "Current branch: ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutParams {
    /// Width of the repository column, percent of the terminal width.
    pub left_percent: u16,
    /// Height of the summary pane, percent of the area above the footer.
    pub summary_percent: u16,
    pub label_height: u16,
    pub input_height: u16,
    pub footer_height: u16,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            left_percent: 25,
            summary_percent: 50,
            label_height: 3,
            input_height: 3,
            footer_height: 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaneRects {
    pub repositories: Rect,
    pub summary: Rect,
    pub selected_repository: Rect,
    pub current_branch: Rect,
    pub log: Rect,
    pub terminal: Rect,
    pub footer: Rect,
}

impl PaneRects {
    pub fn get(&self, id: PaneId) -> Rect {
        match id {
            PaneId::Repositories => self.repositories,
            PaneId::Summary => self.summary,
            PaneId::SelectedRepository => self.selected_repository,
            PaneId::CurrentBranch => self.current_branch,
            PaneId::Log => self.log,
            PaneId::Terminal => self.terminal,
        }
    }
}

fn percent_of(total: u16, percent: u16) -> u16 {
    (u32::from(total) * u32::from(percent.min(100)) / 100) as u16
}

/// Partition a `width` x `height` terminal. Fails below the minimum size.
pub fn compute(params: &LayoutParams, width: u16, height: u16) -> AppResult<PaneRects> {
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        return Err(AppError::TerminalTooSmall { width, height });
    }

    let body_h = height - params.footer_height;
    let left_w = percent_of(width, params.left_percent).max(1);
    let right_x = left_w;
    let right_w = width - left_w;

    let summary_h = percent_of(body_h, params.summary_percent);
    let labels_y = summary_h;
    let log_y = labels_y + params.label_height;
    let terminal_y = body_h.saturating_sub(params.input_height);
    let log_h = terminal_y.saturating_sub(log_y);
    if summary_h == 0 || log_h == 0 || right_w < 2 {
        return Err(AppError::TerminalTooSmall { width, height });
    }

    let selected_w = right_w / 2;

    Ok(PaneRects {
        repositories: Rect::new(0, 0, left_w, body_h),
        summary: Rect::new(right_x, 0, right_w, summary_h),
        selected_repository: Rect::new(right_x, labels_y, selected_w, params.label_height),
        current_branch: Rect::new(
            right_x + selected_w,
            labels_y,
            right_w - selected_w,
            params.label_height,
        ),
        log: Rect::new(right_x, log_y, right_w, log_h),
        terminal: Rect::new(right_x, terminal_y, right_w, params.input_height),
        footer: Rect::new(0, body_h, width, params.footer_height),
    })
}

#[derive(Clone, Debug, Default)]
pub struct LayoutEngine {
    pub params: LayoutParams,
}

impl LayoutEngine {
    pub fn new(params: LayoutParams) -> Self {
        Self { params }
    }

    /// Lay out every pane, creating and initialising any that do not exist
    /// yet. Existing panes only move. Returns true if any pane was created.
    pub fn layout(
        &self,
        registry: &mut PaneRegistry,
        config: &Configuration,
        width: u16,
        height: u16,
    ) -> AppResult<bool> {
        let rects = compute(&self.params, width, height)?;
        let mut created_any = false;

        for id in PaneId::ALL {
            let (pane, created) = registry.upsert(id, rects.get(id));
            if !created {
                continue;
            }
            created_any = true;
            tracing::debug!(pane = %id, rect = ?pane.rect, "pane created");

            match id {
                PaneId::Repositories => {
                    pane.title = Some(REPOSITORIES_TITLE.to_string());
                    pane.highlight_selection = true;
                    for repo in &config.repositories {
                        pane.writeln(&repo.name);
                    }
                }
                PaneId::Summary => {
                    pane.title = Some(SUMMARY_TITLE.to_string());
                    pane.autoscroll = true;
                }
                PaneId::SelectedRepository => {
                    pane.single_line = true;
                    pane.writeln(SELECTED_REPOSITORY_PREFIX);
                }
                PaneId::CurrentBranch => {
                    pane.single_line = true;
                    pane.writeln(CURRENT_BRANCH_PREFIX);
                }
                PaneId::Log => {
                    pane.title = Some(LOG_TITLE.to_string());
                    pane.wrap = true;
                }
                PaneId::Terminal => {
                    pane.title = Some(TERMINAL_TITLE.to_string());
                    pane.editable = true;
                    input::reset_prompt(pane);
                }
            }
        }

        if created_any {
            registry.set_current(PaneId::Terminal)?;
        }
        Ok(created_any)
    }
}
