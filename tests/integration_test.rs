use std::path::Path;
use std::process::Command;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use gitroutine::{
    App, Configuration,
    executor::run_job,
    layout::{self, LayoutParams},
    pane::PaneId,
    runner::ProcessCommandRunner,
    tokenizer::tokenize,
};

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .status()
        .unwrap();
    assert!(status.success(), "git {args:?} failed");
}

fn init_repo(dir: &Path, branch: &str) {
    git(dir, &["init", "-q"]);
    git(dir, &["checkout", "-q", "-b", branch]);
    std::fs::write(dir.join("README"), "hello\n").unwrap();
    git(dir, &["add", "README"]);
    git(dir, &["commit", "-q", "-m", "first commit"]);
}

fn config_for(repos: &[(&str, &Path)]) -> Configuration {
    let entries: Vec<serde_json::Value> = repos
        .iter()
        .map(|(name, path)| serde_json::json!({ "Name": name, "Path": path }))
        .collect();
    Configuration::from_json(&serde_json::json!({ "Repositories": entries }).to_string()).unwrap()
}

fn drain(app: &mut App) {
    while !app.jobs.is_empty() {
        for job in app.take_jobs() {
            let done = run_job(&ProcessCommandRunner, job);
            app.apply_completion(&done).unwrap();
        }
    }
}

fn type_line(app: &mut App, text: &str) {
    for ch in text.chars() {
        let key = KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE);
        app.handle_event(Event::Key(key)).unwrap();
    }
    let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
    app.handle_event(Event::Key(enter)).unwrap();
}

fn pane_text(app: &App, id: PaneId) -> String {
    app.registry.get(id).unwrap().buffer().to_string()
}

#[test]
fn tokenizer_handles_quoted_commit_message() {
    assert_eq!(
        tokenize(r#"commit -m "fix the bug" --amend"#),
        vec!["commit", "-m", "fix the bug", "--amend"]
    );
    assert!(tokenize("   ").is_empty());
}

#[test]
fn layout_tiles_standard_terminal() {
    let rects = layout::compute(&LayoutParams::default(), 120, 40).unwrap();
    let area: u32 = PaneId::ALL
        .iter()
        .map(|id| {
            let r = rects.get(*id);
            r.width as u32 * r.height as u32
        })
        .sum();
    assert_eq!(area + rects.footer.width as u32, 120 * 40);
}

#[test]
fn selecting_a_real_repository_shows_branch_and_log() {
    if !git_available() {
        return;
    }
    let alpha = tempfile::tempdir().unwrap();
    let beta = tempfile::tempdir().unwrap();
    init_repo(alpha.path(), "main");
    init_repo(beta.path(), "feature");

    let config = config_for(&[("alpha", alpha.path()), ("beta", beta.path())]);
    let mut app = App::new(config, "git".to_string());
    app.resize(120, 40).unwrap();
    drain(&mut app);

    assert_eq!(
        pane_text(&app, PaneId::CurrentBranch).trim_end(),
        "Current branch: main"
    );
    assert!(pane_text(&app, PaneId::Log).contains("first commit"));

    app.select("beta").unwrap();
    drain(&mut app);
    assert_eq!(
        pane_text(&app, PaneId::SelectedRepository).trim_end(),
        "Repository: beta"
    );
    assert_eq!(
        pane_text(&app, PaneId::CurrentBranch).trim_end(),
        "Current branch: feature"
    );
}

#[test]
fn prompt_runs_in_selected_repository() {
    if !git_available() {
        return;
    }
    let repo = tempfile::tempdir().unwrap();
    init_repo(repo.path(), "main");

    let config = config_for(&[("only", repo.path())]);
    let mut app = App::new(config, "git".to_string());
    app.resize(120, 40).unwrap();
    drain(&mut app);

    type_line(&mut app, "status --short --branch");
    drain(&mut app);
    assert!(pane_text(&app, PaneId::Summary).contains("## main"));
    assert_eq!(
        app.registry.get(PaneId::Terminal).unwrap().line(0),
        Some("git > ")
    );

    type_line(&mut app, "no-such-subcommand");
    drain(&mut app);
    assert!(pane_text(&app, PaneId::Summary).contains("no-such-subcommand"));

    type_line(&mut app, "clear");
    assert!(app.jobs.is_empty());
    assert!(pane_text(&app, PaneId::Summary).is_empty());
}

#[test]
fn repository_without_commits_has_empty_log() {
    if !git_available() {
        return;
    }
    let repo = tempfile::tempdir().unwrap();
    git(repo.path(), &["init", "-q"]);

    let config = config_for(&[("empty", repo.path())]);
    let mut app = App::new(config, "git".to_string());
    app.resize(120, 40).unwrap();
    drain(&mut app);

    assert!(pane_text(&app, PaneId::Log).is_empty());
    let branch = pane_text(&app, PaneId::CurrentBranch);
    assert!(branch.starts_with("Current branch: "));
    assert_eq!(branch.lines().count(), 1, "{branch:?}");
}
