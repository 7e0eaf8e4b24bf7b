//! CLI - Command Line Interface for cinetui
//!
//! Every action of the movie screen is scriptable. All output is
//! JSON-parseable.
//!
//! # Examples
//!
//! ```bash
//! # Open the TUI on a movie
//! cinetui 550
//!
//! # Movie information screen as JSON
//! cinetui info 550 --json
//!
//! # Toggle list membership (needs a session)
//! cinetui login --account-id 1234 --session-id abc...
//! cinetui favorite 550
//! ```

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::models::ListKind;
use crate::screen::RECOMMENDATION_LIMIT;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error or failed write
    NetworkError = 3,
    /// Movie not found
    NotFound = 4,
    /// Action needs a session
    NoSession = 5,
    /// No TMDB API key configured
    MissingApiKey = 6,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// cinetui - movie information in the terminal
///
/// Run without a subcommand to launch the interactive TUI.
#[derive(Parser, Debug)]
#[command(
    name = "cinetui",
    version,
    about = "Movie information screen backed by TMDB",
    long_about = "Browse a movie's details, cast, trailer and recommendations, \
                  and manage your TMDB favorites and watchlist.\n\n\
                  Run without a subcommand to launch the interactive TUI.",
    after_help = "EXAMPLES:\n\
                  cinetui                      Launch interactive TUI\n\
                  cinetui 550                  Open a movie in the TUI\n\
                  cinetui info 550 --json      Movie screen as JSON\n\
                  cinetui watchlist 550        Toggle watchlist membership",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// TMDB movie id to open the TUI on
    pub movie: Option<u64>,

    /// Subcommand to run (omit for TUI mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Check if running in CLI mode (has subcommand)
    pub fn is_cli_mode(&self) -> bool {
        self.command.is_some()
    }

    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the movie information screen
    #[command(visible_alias = "i")]
    Info(MovieArgs),

    /// Toggle the movie in your favorites
    #[command(visible_alias = "fav")]
    Favorite(MovieArgs),

    /// Toggle the movie in your watchlist
    #[command(visible_alias = "wl")]
    Watchlist(MovieArgs),

    /// List recommendations for a movie
    #[command(visible_alias = "rec")]
    Recommend(RecommendCmd),

    /// Store the TMDB session used for list actions
    Login(LoginCmd),
}

impl Command {
    /// List a toggle subcommand acts on
    pub fn list_kind(&self) -> Option<ListKind> {
        match self {
            Command::Favorite(_) => Some(ListKind::Favorite),
            Command::Watchlist(_) => Some(ListKind::Watchlist),
            _ => None,
        }
    }
}

/// A single TMDB movie id
#[derive(Args, Debug)]
pub struct MovieArgs {
    /// TMDB movie id (e.g., 550)
    pub id: u64,
}

/// Recommendations for a movie
#[derive(Args, Debug)]
pub struct RecommendCmd {
    /// TMDB movie id
    pub id: u64,

    /// Results page
    #[arg(long, short = 'p', default_value = "1")]
    pub page: u32,

    /// Maximum number of results
    #[arg(long, short = 'n', default_value_t = RECOMMENDATION_LIMIT)]
    pub limit: usize,
}

/// Session credentials
#[derive(Args, Debug)]
pub struct LoginCmd {
    /// TMDB account id
    #[arg(long)]
    pub account_id: u64,

    /// TMDB v3 session id
    #[arg(long)]
    pub session_id: String,
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// Result of a favorite/watchlist toggle
#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub movie_id: u64,
    pub list: ListKind,
    /// Local flag after the toggle
    pub member: bool,
    /// Whether TMDB accepted the write
    pub confirmed: bool,
}

/// Result of `login`
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub status: String,
    pub account_id: u64,
    pub path: PathBuf,
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
