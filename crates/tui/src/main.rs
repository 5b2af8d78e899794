mod app;
mod renderer;

use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use icicle_core::{ViewerConfig, load_forest};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{Flow, TerminalApp};

/// Poll interval; one display frame at 60 Hz.
const FRAME: Duration = Duration::from_millis(16);

/// Icicle graph of a sampled call-tree profile, in the terminal.
#[derive(Parser)]
#[command(name = "icicle", version)]
struct Cli {
    /// Profile to open: a JSON forest or collapsed stacks.
    profile: PathBuf,
    /// Viewer settings (TOML). Defaults suit a character grid.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Selection to show first.
    #[arg(long)]
    selection: Option<String>,
    /// Caption of the selection switcher.
    #[arg(long)]
    label: Option<String>,
    /// Write the log here; the terminal itself is owned by the viewer.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(path: Option<&PathBuf>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ViewerConfig::terminal(),
    };
    let forest = load_forest(&cli.profile)
        .with_context(|| format!("opening {}", cli.profile.display()))?;

    let (columns, rows) = crossterm::terminal::size()?;
    let mut app = TerminalApp::new(columns, rows, config, Some(forest))?;
    if let Some(label) = cli.label {
        app.viewer_mut().set_selector_label(label);
    }
    if let Some(key) = &cli.selection {
        app.viewer_mut().select(key)?;
    }

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(out))?;

    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    app.viewer_mut().destroy();

    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut TerminalApp) -> Result<()> {
    let mut dirty = true;
    loop {
        dirty |= app.tick();
        if dirty {
            terminal.draw(|frame| app.draw(frame))?;
            dirty = false;
        }

        if event::poll(FRAME)? {
            let ev = event::read()?;
            if let Flow::Quit = app.handle(&ev) {
                return Ok(());
            }
            // Status and header text can change without a new frame.
            dirty = true;
        }
    }
}
