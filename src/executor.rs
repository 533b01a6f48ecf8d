//! Background command execution.
//!
//! Subprocesses run on a blocking worker so the event loop keeps drawing.
//! Jobs are executed one at a time in submission order, and completions are
//! handed back over a channel to be applied between two terminal events.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::AppResult;
use crate::pane::{PaneId, PaneRegistry};
use crate::runner::{CommandOutput, CommandRunner};

/// One command aimed at one pane.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandJob {
    pub id: u64,
    pub target: PaneId,
    /// Generation of `target` when the job was queued.
    pub generation: u64,
    pub directory: PathBuf,
    pub tokens: Vec<String>,
}

#[derive(Debug)]
pub struct CommandCompletion {
    pub job: CommandJob,
    pub output: CommandOutput,
}

impl CommandCompletion {
    /// Write the output into the target pane unless the pane was cleared
    /// after the job was queued. Returns whether anything was applied.
    pub fn apply(&self, registry: &mut PaneRegistry) -> AppResult<bool> {
        let pane = registry.get_mut(self.job.target)?;
        if pane.generation() != self.job.generation {
            tracing::debug!(
                job = self.job.id,
                pane = %self.job.target,
                "dropping output for a cleared pane"
            );
            return Ok(false);
        }
        self.output.write_to(pane);
        Ok(true)
    }
}

/// Jobs produced by one event handler, waiting to be dispatched.
#[derive(Debug, Default)]
pub struct JobQueue {
    next_id: u64,
    pending: Vec<CommandJob>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `tokens` for `target`, stamped with the pane's current generation.
    pub fn push(
        &mut self,
        registry: &PaneRegistry,
        target: PaneId,
        directory: PathBuf,
        tokens: Vec<String>,
    ) -> AppResult<u64> {
        let generation = registry.get(target)?.generation();
        self.next_id += 1;
        let id = self.next_id;
        self.pending.push(CommandJob {
            id,
            target,
            generation,
            directory,
            tokens,
        });
        Ok(id)
    }

    pub fn take(&mut self) -> Vec<CommandJob> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[CommandJob] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Run a job on the calling thread.
pub fn run_job(runner: &dyn CommandRunner, job: CommandJob) -> CommandCompletion {
    tracing::debug!(job = job.id, tokens = ?job.tokens, dir = %job.directory.display(), "running command");
    let output = runner.run(&job.directory, &job.tokens);
    if let Some(err) = &output.exit_error {
        tracing::info!(job = job.id, error = %err, "command failed");
    }
    CommandCompletion { job, output }
}

/// Handle for queueing commands on the background worker.
pub struct CommandExecutor {
    tx: mpsc::UnboundedSender<CommandJob>,
    cancel: CancellationToken,
}

impl CommandExecutor {
    /// Create the executor and the receiver its completions arrive on.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(runner: Arc<dyn CommandRunner>) -> (Self, mpsc::Receiver<CommandCompletion>) {
        let (job_tx, job_rx) = mpsc::unbounded_channel::<CommandJob>();
        let (done_tx, done_rx) = mpsc::channel::<CommandCompletion>(16);
        let cancel = CancellationToken::new();

        tokio::spawn(executor_task(runner, job_rx, done_tx, cancel.clone()));

        (Self { tx: job_tx, cancel }, done_rx)
    }

    pub fn submit(&self, job: CommandJob) {
        if self.tx.send(job).is_err() {
            tracing::warn!("command executor is gone; job dropped");
        }
    }

    /// Stop the worker after the job in progress, if any.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for CommandExecutor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn executor_task(
    runner: Arc<dyn CommandRunner>,
    mut rx: mpsc::UnboundedReceiver<CommandJob>,
    tx: mpsc::Sender<CommandCompletion>,
    cancel: CancellationToken,
) {
    loop {
        let job = tokio::select! {
            _ = cancel.cancelled() => break,
            job = rx.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        let job_id = job.id;
        let runner = Arc::clone(&runner);
        let result = tokio::task::spawn_blocking(move || run_job(runner.as_ref(), job)).await;

        let completion = match result {
            Ok(completion) => completion,
            Err(e) => {
                tracing::error!(job = job_id, error = %e, "command task panicked");
                continue;
            }
        };

        if cancel.is_cancelled() {
            break;
        }
        if tx.send(completion).await.is_err() {
            break;
        }
    }
    tracing::debug!("command executor stopped");
}
