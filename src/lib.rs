//! Terminal dashboard for a fixed set of local git repositories.
//!
//! The screen is split into named panes: a repository list, a summary of
//! command output, labels for the active repository and branch, the commit
//! graph and a `git > ` prompt. Commands run as subprocesses in the active
//! repository's directory and their output lands in the target pane.

pub mod ansi;
pub mod app;
pub mod config;
pub mod error;
pub mod executor;
pub mod input;
pub mod layout;
pub mod pane;
pub mod runner;
pub mod selection;
pub mod tokenizer;
pub mod ui;

pub use app::App;
pub use config::{Configuration, Repository};
pub use error::{AppError, AppResult};
