//! Top-level application state.
//!
//! [`App`] ties the loaded configuration, the selection session, the pane
//! registry and the pending job queue together. The event loop feeds it
//! terminal events and command completions; it never runs a process itself.

use crossterm::event::{Event, KeyEventKind};

use crate::config::Configuration;
use crate::error::{AppError, AppResult};
use crate::executor::{CommandCompletion, CommandJob, JobQueue};
use crate::input::{self, Flow};
use crate::layout::{LayoutEngine, LayoutParams};
use crate::pane::PaneRegistry;
use crate::selection::{SelectOutcome, SelectionController, Session};

/// Session state plus every pane, driven by the event loop.
pub struct App {
    pub config: Configuration,
    /// Program the `git > ` prompt runs.
    pub executable: String,
    pub session: Session,
    pub registry: PaneRegistry,
    pub jobs: JobQueue,
    pub layout: LayoutEngine,
    pub too_small: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Configuration, executable: String) -> Self {
        Self::with_layout(config, executable, LayoutParams::default())
    }

    pub fn with_layout(config: Configuration, executable: String, params: LayoutParams) -> Self {
        Self {
            config,
            executable,
            session: Session::default(),
            registry: PaneRegistry::new(),
            jobs: JobQueue::new(),
            layout: LayoutEngine::new(params),
            too_small: false,
            should_quit: false,
        }
    }

    /// Lay out for a new terminal size, then make sure a repository is
    /// selected. A terminal below the minimum size is not an error; panes
    /// keep their last geometry until it grows again.
    pub fn resize(&mut self, width: u16, height: u16) -> AppResult<()> {
        match self
            .layout
            .layout(&mut self.registry, &self.config, width, height)
        {
            Ok(_) => self.too_small = false,
            Err(AppError::TerminalTooSmall { .. }) => {
                tracing::debug!(width, height, "terminal below minimum size");
                self.too_small = true;
                return Ok(());
            }
            Err(e) => return Err(e),
        }
        self.select("")?;
        Ok(())
    }

    pub fn select(&mut self, name: &str) -> AppResult<SelectOutcome> {
        let ctrl = SelectionController {
            config: &self.config,
            executable: &self.executable,
        };
        ctrl.select(&mut self.session, &mut self.registry, &mut self.jobs, name)
    }

    /// Dispatch one terminal event. Errors abort only this event.
    pub fn handle_event(&mut self, event: Event) -> AppResult<()> {
        let flow = match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                input::handle_key_event(self, key)?
            }
            Event::Mouse(mouse) => input::handle_mouse_event(self, mouse)?,
            Event::Resize(width, height) => {
                self.resize(width, height)?;
                Flow::Continue
            }
            _ => Flow::Continue,
        };
        if flow == Flow::Quit {
            tracing::info!("quit requested");
            self.should_quit = true;
        }
        Ok(())
    }

    pub fn apply_completion(&mut self, completion: &CommandCompletion) -> AppResult<bool> {
        completion.apply(&mut self.registry)
    }

    pub fn take_jobs(&mut self) -> Vec<CommandJob> {
        self.jobs.take()
    }
}
