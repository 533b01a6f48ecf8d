use std::{env, io, path::Path, sync::Arc, time::Duration};

use anyhow::Context;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};

use gitroutine::{
    App, Configuration,
    config::{self, ENV_LOG_FILTER},
    executor::CommandExecutor,
    runner::ProcessCommandRunner,
    ui,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const USAGE: &str = "\
Usage: gitroutine [CONFIG]

Browse the repositories listed in CONFIG (default: $GITROUTINE_CONFIG or
./config.json) and run git commands against the selected one.

Environment:
  GITROUTINE_CONFIG  configuration file used when CONFIG is omitted
  GITROUTINE_GIT     program run by the prompt (default: git)
  GITROUTINE_LOG     log filter, e.g. debug or gitroutine=trace

Options:
  -h, --help         print this help
  -V, --version      print the version";

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let arg = env::args().nth(1);
    match arg.as_deref() {
        Some("--version" | "-V") => {
            println!("gitroutine {VERSION}");
            return Ok(());
        }
        Some("--help" | "-h") => {
            println!("{USAGE}");
            return Ok(());
        }
        _ => {}
    }

    if let Err(error) = init_file_logging(&config::log_file_path()) {
        eprintln!("gitroutine: logging disabled: {error:#}");
    }
    tracing::info!(version = VERSION, "starting");

    let config_path = config::resolve_config_path(arg.as_deref());
    let config = Configuration::load_or_default(&config_path);
    let mut app = App::new(config, config::executable_name());

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(error) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
        let _ = disable_raw_mode();
        return Err(error).context("failed to enter the alternate screen");
    }
    let mut terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(terminal) => terminal,
        Err(error) => {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
            return Err(error).context("failed to initialize the terminal");
        }
    };

    let result = run(&mut terminal, &mut app).await;

    let _ = disable_raw_mode();
    let _ = execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    );
    let _ = terminal.show_cursor();

    match &result {
        Ok(()) => tracing::info!("exiting"),
        Err(error) => tracing::error!(error = %format!("{error:#}"), "exiting on error"),
    }
    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> anyhow::Result<()> {
    let (executor, mut completions) = CommandExecutor::new(Arc::new(ProcessCommandRunner));
    let mut event_stream = EventStream::new();

    let size = terminal.size().context("failed to query terminal size")?;
    if let Err(error) = app.resize(size.width, size.height) {
        tracing::warn!(%error, "initial layout failed");
    }

    loop {
        for job in app.take_jobs() {
            executor.submit(job);
        }

        terminal.draw(|f| ui::draw(f, app))?;

        if app.should_quit {
            break;
        }

        let poll_timeout = tokio::time::sleep(Duration::from_millis(100));
        tokio::pin!(poll_timeout);

        tokio::select! {
            Some(completion) = completions.recv() => {
                if let Err(error) = app.apply_completion(&completion) {
                    tracing::warn!(%error, job = completion.job.id, "could not apply command output");
                }
            }
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(event)) => {
                        if let Err(error) = app.handle_event(event) {
                            tracing::warn!(%error, "event handling failed");
                        }
                    }
                    Some(Err(error)) => {
                        return Err(error).context("failed to read terminal events");
                    }
                    None => break,
                }
            }
            _ = &mut poll_timeout => {}
        }
    }

    executor.shutdown();
    Ok(())
}

fn init_file_logging(log_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create log directory '{}'", parent.display())
            })?;
        }
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("failed to open log file '{}'", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env(ENV_LOG_FILTER)
                .unwrap_or_else(|_| "info".into()),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .init();

    Ok(())
}
