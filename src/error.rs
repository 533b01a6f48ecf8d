//! Error surface shared by the controllers and the event loop.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::pane::PaneId;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// A handler needed a screen region that has not been laid out yet.
    #[error("pane '{0}' does not exist")]
    PaneNotFound(PaneId),
    #[error("terminal {width}x{height} is below the minimum supported size")]
    TerminalTooSmall { width: u16, height: u16 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse configuration '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
