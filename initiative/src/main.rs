//! Initiative tracker TUI.
//!
//! A terminal combat tracker for D&D tables: agents in initiative order,
//! inline editing, creature stat blocks and JSON save/load.
//!
//! # Headless Mode
//!
//! Run with `--headless` for a line-oriented interface suitable for scripting:
//!
//! ```bash
//! printf 'add Mira\nset 1 init 18\nlist\n' | cargo run -p initiative -- --headless
//! ```

mod app;
mod events;
mod headless;
mod ui;

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use initiative_core::{FileStorage, Session, SessionConfig};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::{self, File, OpenOptions};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::App;
use events::{handle_event, EventResult};
use ui::render::render;

/// Environment variable overriding the data directory
const DATA_DIR_ENV: &str = "INITIATIVE_DATA_DIR";

const DEFAULT_LOG_FILTER: &str = "initiative=info,initiative_core=info";

/// D&D initiative and combat tracker
#[derive(Parser, Debug)]
#[command(name = "initiative")]
#[command(author, version, about = "Initiative tracker for D&D 5e", long_about = None)]
struct Args {
    /// Directory holding agents.json and creatures.json
    #[arg(short = 'd', long = "data-dir")]
    data_dir: Option<PathBuf>,

    /// Log file (defaults to initiative.log in the data directory)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Read commands from stdin instead of opening the TUI
    #[arg(long = "headless")]
    headless: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let data_dir = resolve_data_dir(args.data_dir, std::env::var_os(DATA_DIR_ENV));
    fs::create_dir_all(&data_dir)?;

    if args.headless {
        init_logging(None)?;
        info!(data_dir = %data_dir.display(), "starting headless");
        headless::run_headless(SessionConfig::new(&data_dir))?;
        return Ok(());
    }

    let log_file = args.log_file.unwrap_or_else(|| data_dir.join("initiative.log"));
    init_logging(Some(&log_file))?;
    info!(data_dir = %data_dir.display(), "starting tracker");

    let session = Session::new(SessionConfig::new(&data_dir));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, App::new(session));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    info!("tracker closed");
    Ok(())
}

/// Command line beats the environment, which beats the platform default.
fn resolve_data_dir(arg: Option<PathBuf>, env: Option<std::ffi::OsString>) -> PathBuf {
    arg.or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(FileStorage::default_dir)
}

/// Install the tracing subscriber. The TUI owns the terminal, so its logs go
/// to a file; headless mode logs to stderr.
fn init_logging(log_file: Option<&Path>) -> io::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    match log_file {
        Some(path) => {
            let file: File = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                .init();
        }
    }
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, mut app: App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render(f, &app))?;

        if event::poll(Duration::from_millis(250))? {
            let ev = event::read()?;
            match handle_event(&mut app, ev) {
                EventResult::Quit => return Ok(()),
                EventResult::NeedsRedraw | EventResult::Continue => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_precedence() {
        let from_arg = resolve_data_dir(Some("cli".into()), Some("env".into()));
        assert_eq!(from_arg, PathBuf::from("cli"));

        let from_env = resolve_data_dir(None, Some("env".into()));
        assert_eq!(from_env, PathBuf::from("env"));

        let fallback = resolve_data_dir(None, Some("".into()));
        assert_eq!(fallback, FileStorage::default_dir());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["initiative", "--data-dir", "/tmp/x", "--headless"]);
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(args.headless);
        assert!(args.log_file.is_none());
    }
}
