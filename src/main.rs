//! cinetui - movie information screen for the terminal
//!
//! # Usage
//!
//! ```bash
//! # Launch interactive TUI
//! cinetui
//! cinetui 550
//!
//! # CLI mode (for automation)
//! cinetui info 550 --json
//! cinetui favorite 550
//! ```

use std::io::{stdout, Stdout};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use cinetui::app::{App, AppMessage, Effect, Route};
use cinetui::catalog::Catalog;
use cinetui::cli::{Cli, Command, ExitCode, Output};
use cinetui::commands::{self, CommandContext};
use cinetui::config::Config;
use cinetui::logging::{self, LogTarget};
use cinetui::session::{Session, SessionStore};

/// Terminal type alias for convenience
type Tui = Terminal<CrosstermBackend<Stdout>>;

const MISSING_KEY: &str = "No TMDB API key: set TMDB_API_KEY or tmdb_api_key in the config file";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    if cli.is_cli_mode() {
        logging::init(LogTarget::Stderr)?;
        let exit_code = run_cli(cli, &config).await;
        std::process::exit(exit_code.into());
    } else {
        logging::init(LogTarget::File)?;
        run_tui(&config, cli.movie).await
    }
}

fn load_session(store: Option<&SessionStore>) -> Session {
    store.map(SessionStore::load).unwrap_or_default()
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli, config: &Config) -> ExitCode {
    let output = Output::new(&cli);
    let store = SessionStore::open_default();

    let Some(command) = cli.command else {
        return ExitCode::Success;
    };

    let command = match command {
        Command::Login(cmd) => {
            return match &store {
                Some(store) => commands::login_cmd(cmd, store, &output),
                None => output.error("Could not determine data directory", ExitCode::Error),
            };
        }
        other => other,
    };

    let Some(ctx) = CommandContext::from_config(config, load_session(store.as_ref())) else {
        return output.error(MISSING_KEY, ExitCode::MissingApiKey);
    };

    let kind = command.list_kind();
    match (command, kind) {
        (Command::Info(cmd), _) => commands::info_cmd(cmd, &ctx, &output).await,
        (Command::Favorite(cmd) | Command::Watchlist(cmd), Some(kind)) => {
            commands::toggle_cmd(kind, cmd, &ctx, &output).await
        }
        (Command::Recommend(cmd), _) => commands::recommend_cmd(cmd, &ctx, &output).await,
        _ => ExitCode::Success,
    }
}

// =============================================================================
// TUI Mode
// =============================================================================

/// Initialize the terminal for TUI mode
fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run interactive TUI
async fn run_tui(config: &Config, movie: Option<u64>) -> Result<()> {
    let session = load_session(SessionStore::open_default().as_ref());
    let Some(ctx) = CommandContext::from_config(config, session) else {
        anyhow::bail!(MISSING_KEY);
    };
    let CommandContext {
        catalog,
        session,
        image_base_url,
    } = ctx;

    let mut app = App::new(catalog.clone(), session, image_base_url);
    if let Some(id) = movie {
        app.navigate(Route::Movie(id));
    }

    let mut terminal = init_terminal()?;
    let result = run_event_loop(&mut terminal, &mut app, catalog).await;

    // Always restore terminal, even on error
    restore_terminal(&mut terminal)?;

    result
}

/// Main event loop - handles input, runs effects, applies their outcomes
async fn run_event_loop(terminal: &mut Tui, app: &mut App, catalog: Catalog) -> Result<()> {
    const TICK_RATE: Duration = Duration::from_millis(100);

    let (tx, mut rx) = mpsc::unbounded_channel();

    while app.running {
        for effect in app.take_effects() {
            spawn_effect(effect, &catalog, &tx);
        }

        terminal.draw(|frame| cinetui::ui::render(frame, app))?;

        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (ignore releases on Windows)
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        drain_messages(app, &mut rx);
    }

    Ok(())
}

fn drain_messages(app: &mut App, rx: &mut UnboundedReceiver<AppMessage>) {
    while let Ok(message) = rx.try_recv() {
        app.apply(message);
    }
}

/// Run one effect off the loop; its outcome comes back over `tx`
fn spawn_effect(effect: Effect, catalog: &Catalog, tx: &UnboundedSender<AppMessage>) {
    match effect {
        Effect::Fetch(request) => {
            let catalog = catalog.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                catalog.load(&request).await;
                let _ = tx.send(AppMessage::QuerySettled(request));
            });
        }
        Effect::Write(write) => {
            let client = catalog.client().clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = write.send(&client).await;
                let _ = tx.send(AppMessage::WriteSettled(write, result));
            });
        }
        Effect::OpenUrl(url) => {
            if let Err(e) = open::that_detached(&url) {
                tracing::warn!(%url, error = %e, "failed to open browser");
            }
        }
    }
}
