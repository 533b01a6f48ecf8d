//! External process execution.
//!
//! Commands run with their standard streams captured as text. A failing or
//! missing program is reported through [`CommandOutput::exit_error`] and never
//! aborts the caller.

use std::{
    path::Path,
    process::{Command, Stdio},
};

use crate::pane::Pane;

/// Pseudo-command that clears the destination pane instead of spawning.
pub const CLEAR_COMMAND: &str = "clear";
pub const FAILURE_MESSAGE: &str = "Failed to execute command. Please try again.";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_error: Option<String>,
}

impl CommandOutput {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            exit_error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn success(&self) -> bool {
        self.exit_error.is_none()
    }

    /// Append this output to `pane`: stdout, then on failure stderr or a
    /// generic message. Trailing newlines collapse to one. Single-line panes
    /// get only the first line of whichever text would come first.
    pub fn write_to(&self, pane: &mut Pane) {
        if pane.single_line {
            pane.writeln(self.first_line());
            return;
        }
        let stdout = self.stdout.trim_end_matches(['\r', '\n']);
        if !stdout.is_empty() {
            pane.writeln(stdout);
        }
        if self.success() {
            return;
        }
        let stderr = self.stderr.trim_end_matches(['\r', '\n']);
        if stderr.trim().is_empty() {
            pane.writeln(FAILURE_MESSAGE);
        } else {
            pane.writeln(stderr);
        }
    }

    fn first_line(&self) -> &str {
        if let Some(line) = first_nonblank_line(&self.stdout) {
            return line;
        }
        if self.success() {
            return "";
        }
        first_nonblank_line(&self.stderr).unwrap_or(FAILURE_MESSAGE)
    }
}

fn first_nonblank_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim_end).find(|l| !l.is_empty())
}

/// How a tokenized command line should be handled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invocation {
    /// Nothing to run.
    Empty,
    /// Clear the destination pane; no process is started.
    Clear,
    /// Program followed by its arguments.
    Exec(Vec<String>),
}

impl Invocation {
    /// Classify `args` run through `program` (when the line used the prompt
    /// convention) or as a full command line.
    pub fn classify(program: Option<&str>, args: Vec<String>) -> Self {
        match args.first().map(String::as_str) {
            None => Invocation::Empty,
            Some(CLEAR_COMMAND) => Invocation::Clear,
            Some(_) => match program {
                Some(program) => {
                    let mut tokens = Vec::with_capacity(args.len() + 1);
                    tokens.push(program.to_string());
                    tokens.extend(args);
                    Invocation::Exec(tokens)
                }
                None => Invocation::Exec(args),
            },
        }
    }
}

pub trait CommandRunner: Send + Sync {
    /// Run `tokens[0]` with the remaining tokens as arguments inside
    /// `directory`, blocking until it exits.
    fn run(&self, directory: &Path, tokens: &[String]) -> CommandOutput;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run(&self, directory: &Path, tokens: &[String]) -> CommandOutput {
        let Some((program, args)) = tokens.split_first() else {
            return CommandOutput::failed("empty command");
        };

        let result = Command::new(program)
            .args(args)
            .current_dir(directory)
            .stdin(Stdio::null())
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_PAGER", "cat")
            .env("PAGER", "cat")
            .env("GIT_EDITOR", ":")
            .env("EDITOR", ":")
            .env("GIT_SEQUENCE_EDITOR", ":")
            .env("GIT_MERGE_AUTOEDIT", "no")
            .output();

        match result {
            Ok(out) => {
                let stdout = String::from_utf8_lossy(&out.stdout).to_string();
                let stderr = String::from_utf8_lossy(&out.stderr).to_string();
                let exit_error = if out.status.success() {
                    None
                } else {
                    Some(format!("{program} {}", out.status))
                };
                CommandOutput {
                    stdout,
                    stderr,
                    exit_error,
                }
            }
            Err(e) => {
                tracing::warn!(%program, dir = %directory.display(), error = %e, "failed to start command");
                CommandOutput::failed(format!("{program}: {e}"))
            }
        }
    }
}
