//! Switching the active repository.
//!
//! Selecting a repository rewrites the label panes, resets the log pane and
//! queues the branch and log queries against the repository's directory.

use std::path::PathBuf;

use crate::config::{Configuration, Repository};
use crate::error::AppResult;
use crate::executor::JobQueue;
use crate::layout::{CURRENT_BRANCH_PREFIX, SELECTED_REPOSITORY_PREFIX};
use crate::pane::{PaneId, PaneRegistry};

pub const CURRENT_BRANCH_ARGS: &[&str] = &["rev-parse", "--abbrev-ref", "HEAD"];
pub const LOG_ARGS: &[&str] = &[
    "-c",
    "color.ui=always",
    "log",
    "--all",
    "--decorate",
    "--oneline",
    "--graph",
];

#[derive(Clone, Debug, Default)]
pub struct Session {
    pub current_repository: Option<Repository>,
    pub has_initialized_selection: bool,
}

impl Session {
    /// Directory commands run in: the active repository, else the cwd.
    pub fn working_directory(&self) -> PathBuf {
        match &self.current_repository {
            Some(repo) => repo.path.clone(),
            None => PathBuf::from("."),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected(String),
    /// Empty name after a selection was already made.
    Unchanged,
    /// Empty name on first use with no repositories configured.
    NoRepositories,
    NotFound(String),
}

pub struct SelectionController<'a> {
    pub config: &'a Configuration,
    pub executable: &'a str,
}

impl SelectionController<'_> {
    /// Select `name`, or with an empty name auto-select the first repository
    /// exactly once.
    pub fn select(
        &self,
        session: &mut Session,
        registry: &mut PaneRegistry,
        jobs: &mut JobQueue,
        name: &str,
    ) -> AppResult<SelectOutcome> {
        let name = name.trim();
        let index = if name.is_empty() {
            if session.has_initialized_selection {
                return Ok(SelectOutcome::Unchanged);
            }
            if self.config.repositories.is_empty() {
                session.has_initialized_selection = true;
                tracing::info!("no repositories configured; nothing to select");
                return Ok(SelectOutcome::NoRepositories);
            }
            0
        } else {
            match self.config.repositories.iter().position(|r| r.name == name) {
                Some(idx) => idx,
                None => {
                    tracing::warn!(name, "no configured repository with this name");
                    return Ok(SelectOutcome::NotFound(name.to_string()));
                }
            }
        };

        let repo = &self.config.repositories[index];
        self.activate(session, registry, jobs, index, repo)?;
        Ok(SelectOutcome::Selected(repo.name.clone()))
    }

    fn activate(
        &self,
        session: &mut Session,
        registry: &mut PaneRegistry,
        jobs: &mut JobQueue,
        index: usize,
        repo: &Repository,
    ) -> AppResult<()> {
        // Fail before touching anything if a pane is missing.
        for id in PaneId::ALL {
            registry.get(id)?;
        }

        tracing::info!(name = %repo.name, path = %repo.path.display(), "repository selected");
        session.current_repository = Some(repo.clone());
        session.has_initialized_selection = true;

        let repos = registry.get_mut(PaneId::Repositories)?;
        repos.reveal_line(u16::try_from(index).unwrap_or(u16::MAX));

        let summary = registry.get_mut(PaneId::Summary)?;
        summary.clear();
        summary.set_cursor(0, 0);

        let label = registry.get_mut(PaneId::SelectedRepository)?;
        label.clear();
        label.writeln(&format!("{SELECTED_REPOSITORY_PREFIX}{}", repo.name));

        let branch = registry.get_mut(PaneId::CurrentBranch)?;
        branch.clear();
        branch.write(CURRENT_BRANCH_PREFIX);

        let log = registry.get_mut(PaneId::Log)?;
        log.clear();
        log.set_origin(0, 0);

        jobs.push(
            registry,
            PaneId::CurrentBranch,
            repo.path.clone(),
            self.command(CURRENT_BRANCH_ARGS),
        )?;
        jobs.push(registry, PaneId::Log, repo.path.clone(), self.command(LOG_ARGS))?;
        Ok(())
    }

    fn command(&self, args: &[&str]) -> Vec<String> {
        std::iter::once(self.executable)
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::executor::run_job;
    use crate::layout::LayoutEngine;
    use crate::runner::{CommandOutput, CommandRunner};
    use parking_lot::Mutex;
    use std::path::Path;

    #[derive(Default)]
    struct RecordingRunner {
        calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, directory: &Path, tokens: &[String]) -> CommandOutput {
            self.calls
                .lock()
                .push((directory.to_path_buf(), tokens.to_vec()));
            let stdout = if tokens.iter().any(|t| t == "rev-parse") {
                "main\n"
            } else {
                "* 1a2b3c4 (HEAD -> main) first\n"
            };
            CommandOutput {
                stdout: stdout.to_string(),
                ..CommandOutput::default()
            }
        }
    }

    fn config() -> Configuration {
        Configuration::from_json(
            r#"{"Repositories":[{"Name":"demo","Path":"/tmp/demo"},{"Name":"tools","Path":"/srv/tools"}]}"#,
        )
        .unwrap()
    }

    fn setup(config: &Configuration) -> (Session, PaneRegistry, JobQueue) {
        let mut registry = PaneRegistry::new();
        LayoutEngine::default()
            .layout(&mut registry, config, 100, 40)
            .unwrap();
        (Session::default(), registry, JobQueue::new())
    }

    fn run_all(runner: &RecordingRunner, registry: &mut PaneRegistry, jobs: &mut JobQueue) {
        for job in jobs.take() {
            run_job(runner, job).apply(registry).unwrap();
        }
    }

    #[test]
    fn selecting_each_repository_runs_branch_and_log_in_its_directory() {
        let cfg = config();
        let ctrl = SelectionController {
            config: &cfg,
            executable: "git",
        };
        for repo in &cfg.repositories {
            let (mut session, mut registry, mut jobs) = setup(&cfg);
            let runner = RecordingRunner::default();

            let outcome = ctrl
                .select(&mut session, &mut registry, &mut jobs, &repo.name)
                .unwrap();
            assert_eq!(outcome, SelectOutcome::Selected(repo.name.clone()));
            assert_eq!(session.working_directory(), repo.path);

            run_all(&runner, &mut registry, &mut jobs);
            let calls = runner.calls.lock();
            assert_eq!(calls.len(), 2);
            assert!(calls.iter().all(|(dir, _)| dir == &repo.path));
            let branch_query: Vec<String> = ["git", "rev-parse", "--abbrev-ref", "HEAD"]
                .map(String::from)
                .to_vec();
            assert_eq!(calls[0].1, branch_query);
            assert_eq!(calls[1].1.get(3).map(String::as_str), Some("log"));

            assert_eq!(
                registry.get(PaneId::CurrentBranch).unwrap().line(0),
                Some("Current branch: main")
            );
            assert_eq!(
                registry.get(PaneId::SelectedRepository).unwrap().line(0),
                Some(format!("Repository: {}", repo.name).as_str())
            );
            assert_eq!(
                registry.get(PaneId::Log).unwrap().line(0),
                Some("* 1a2b3c4 (HEAD -> main) first")
            );
        }
    }

    #[test]
    fn empty_name_auto_selects_first_repository_once() {
        let cfg = config();
        let ctrl = SelectionController {
            config: &cfg,
            executable: "git",
        };
        let (mut session, mut registry, mut jobs) = setup(&cfg);

        let first = ctrl
            .select(&mut session, &mut registry, &mut jobs, "")
            .unwrap();
        assert_eq!(first, SelectOutcome::Selected("demo".to_string()));
        assert_eq!(jobs.pending().len(), 2);
        jobs.take();

        let second = ctrl
            .select(&mut session, &mut registry, &mut jobs, "")
            .unwrap();
        assert_eq!(second, SelectOutcome::Unchanged);
        assert!(jobs.is_empty());
    }

    #[test]
    fn unknown_name_changes_nothing() {
        let cfg = config();
        let ctrl = SelectionController {
            config: &cfg,
            executable: "git",
        };
        let (mut session, mut registry, mut jobs) = setup(&cfg);
        let runner = RecordingRunner::default();
        ctrl.select(&mut session, &mut registry, &mut jobs, "demo")
            .unwrap();
        run_all(&runner, &mut registry, &mut jobs);
        let log_before = registry.get(PaneId::Log).unwrap().buffer().to_string();

        let outcome = ctrl
            .select(&mut session, &mut registry, &mut jobs, "nope")
            .unwrap();
        assert_eq!(outcome, SelectOutcome::NotFound("nope".to_string()));
        assert!(jobs.is_empty());
        assert_eq!(session.current_repository.as_ref().unwrap().name, "demo");
        assert_eq!(registry.get(PaneId::Log).unwrap().buffer(), log_before);
    }

    #[test]
    fn reselection_discards_output_of_previous_repository() {
        let cfg = config();
        let ctrl = SelectionController {
            config: &cfg,
            executable: "git",
        };
        let (mut session, mut registry, mut jobs) = setup(&cfg);
        let runner = RecordingRunner::default();

        ctrl.select(&mut session, &mut registry, &mut jobs, "demo")
            .unwrap();
        let stale = jobs.take();
        ctrl.select(&mut session, &mut registry, &mut jobs, "tools")
            .unwrap();

        for job in stale {
            assert!(!run_job(&runner, job).apply(&mut registry).unwrap());
        }
        assert_eq!(
            registry.get(PaneId::CurrentBranch).unwrap().buffer(),
            CURRENT_BRANCH_PREFIX
        );
    }

    #[test]
    fn empty_configuration_marks_initialized() {
        let cfg = Configuration::default();
        let ctrl = SelectionController {
            config: &cfg,
            executable: "git",
        };
        let (mut session, mut registry, mut jobs) = setup(&cfg);
        assert_eq!(
            ctrl.select(&mut session, &mut registry, &mut jobs, "")
                .unwrap(),
            SelectOutcome::NoRepositories
        );
        assert!(session.has_initialized_selection);
        assert!(session.current_repository.is_none());
    }

    #[test]
    fn missing_panes_abort_without_side_effects() {
        let cfg = config();
        let ctrl = SelectionController {
            config: &cfg,
            executable: "git",
        };
        let mut session = Session::default();
        let mut registry = PaneRegistry::new();
        let mut jobs = JobQueue::new();
        let err = ctrl
            .select(&mut session, &mut registry, &mut jobs, "demo")
            .unwrap_err();
        assert!(matches!(err, AppError::PaneNotFound(_)));
        assert!(session.current_repository.is_none());
        assert!(!session.has_initialized_selection);
        assert!(jobs.is_empty());
    }
}
