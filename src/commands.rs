//! CLI Command Handlers
//!
//! Each handler drives the same [`MovieScreen`] the TUI uses, so the JSON
//! printed here is exactly what the screen would render. Handlers take CLI
//! args and [`Output`], and return an [`ExitCode`].

use futures::future::join_all;

use crate::api::{TmdbClient, TmdbError};
use crate::catalog::{Catalog, RecommendationsKey};
use crate::cli::{
    ExitCode, LoginCmd, LoginResponse, MovieArgs, Output, RecommendCmd, ToggleResponse,
};
use crate::config::Config;
use crate::models::ListKind;
use crate::screen::{ActionError, MovieScreen, ViewState};
use crate::session::{Session, SessionStore};

/// What every TMDB-backed command needs
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub catalog: Catalog,
    pub session: Session,
    pub image_base_url: String,
}

impl CommandContext {
    /// Build from config and the session store; `None` when no API key is set
    pub fn from_config(config: &Config, session: Session) -> Option<Self> {
        let api_key = config.tmdb_api_key()?;
        let client = TmdbClient::with_base_url(api_key, config.api_base_url());
        Some(Self {
            catalog: Catalog::new(client, config.cache_max_age()),
            session,
            image_base_url: config.image_base_url().to_string(),
        })
    }

    fn screen(&self, movie_id: u64) -> MovieScreen {
        MovieScreen::new(movie_id, self.session.clone(), self.image_base_url.clone())
    }

    /// Run every read of a screen concurrently, then derive its flags
    async fn load(&self, screen: &mut MovieScreen) {
        let queries = screen.queries();
        join_all(queries.iter().map(|q| self.catalog.load(q))).await;
        screen.sync(&self.catalog);
    }
}

fn exit_code_for(error: &TmdbError) -> ExitCode {
    match error {
        TmdbError::NotFound => ExitCode::NotFound,
        TmdbError::Unauthorized => ExitCode::MissingApiKey,
        _ => ExitCode::NetworkError,
    }
}

/// Print the error behind a non-loaded screen
fn report_unloaded(ctx: &CommandContext, movie_id: u64, output: &Output) -> ExitCode {
    match &ctx.catalog.movie_state(movie_id).error {
        Some(e) => output.error(format!("Movie {}: {}", movie_id, e), exit_code_for(e)),
        None => output.error(format!("Movie {} did not load", movie_id), ExitCode::Error),
    }
}

// =============================================================================
// Info Command
// =============================================================================

pub async fn info_cmd(cmd: MovieArgs, ctx: &CommandContext, output: &Output) -> ExitCode {
    output.info(format!("Getting info for movie {}", cmd.id));

    let mut screen = ctx.screen(cmd.id);
    ctx.load(&mut screen).await;

    match screen.view_state(&ctx.catalog) {
        ViewState::Loaded(view) => {
            if let Err(e) = output.print(&*view) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        ViewState::Error(_) | ViewState::Loading => report_unloaded(ctx, cmd.id, output),
    }
}

// =============================================================================
// Favorite / Watchlist Commands
// =============================================================================

/// Toggle list membership once, the way the screen's button does
pub async fn toggle_cmd(
    kind: ListKind,
    cmd: MovieArgs,
    ctx: &CommandContext,
    output: &Output,
) -> ExitCode {
    if !ctx.session.is_authenticated() {
        return output.error(
            "No session: run `cinetui login --account-id <id> --session-id <sid>` first",
            ExitCode::NoSession,
        );
    }

    // The write asks for the inverse of the derived flag
    let mut screen = ctx.screen(cmd.id);
    ctx.load(&mut screen).await;
    if !matches!(screen.view_state(&ctx.catalog), ViewState::Loaded(_)) {
        return report_unloaded(ctx, cmd.id, output);
    }
    let write = match screen.begin_toggle(kind) {
        Ok(write) => write,
        Err(e @ ActionError::NoSession) => return output.error(e.to_string(), ExitCode::NoSession),
        Err(e) => return output.error(e.to_string(), ExitCode::Error),
    };

    output.info(format!(
        "{} movie {} {} {}",
        if write.value { "Adding" } else { "Removing" },
        cmd.id,
        if write.value { "to" } else { "from" },
        kind
    ));

    let result = write.send(ctx.catalog.client()).await;
    screen.settle_write(&write, &result);

    let response = ToggleResponse {
        movie_id: cmd.id,
        list: kind,
        member: screen.flag(kind),
        confirmed: result.is_ok(),
    };
    if let Err(e) = output.print(&response) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }

    match result {
        Ok(()) => ExitCode::Success,
        Err(e) => exit_code_for(&e),
    }
}

// =============================================================================
// Recommend Command
// =============================================================================

pub async fn recommend_cmd(cmd: RecommendCmd, ctx: &CommandContext, output: &Output) -> ExitCode {
    let key = RecommendationsKey {
        movie_id: cmd.id,
        page: cmd.page,
    };

    match ctx.catalog.recommendations(key).await {
        Ok(page) => {
            let results: Vec<_> = page.results.iter().take(cmd.limit).collect();
            if let Err(e) = output.print(&results) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.error(format!("Recommendations failed: {}", e), exit_code_for(&e)),
    }
}

// =============================================================================
// Login Command
// =============================================================================

pub fn login_cmd(cmd: LoginCmd, store: &SessionStore, output: &Output) -> ExitCode {
    if cmd.session_id.trim().is_empty() {
        return output.error("Session id must not be empty", ExitCode::InvalidArgs);
    }

    let session = Session::authenticated(cmd.account_id, cmd.session_id.trim());
    if let Err(e) = store.save(&session) {
        return output.error(format!("Failed to save session: {}", e), ExitCode::Error);
    }
    tracing::info!(account_id = cmd.account_id, path = %store.path().display(), "session stored");

    let response = LoginResponse {
        status: "ok".to_string(),
        account_id: cmd.account_id,
        path: store.path().to_path_buf(),
    };
    if let Err(e) = output.print(&response) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    ExitCode::Success
}
