//! Account session for write actions
//!
//! The session id and account id live in a small TOML key-value file in the
//! data directory (`~/.local/share/cinetui/session.toml` on Linux). The
//! screen only reads it; `cinetui login` writes it.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Credentials the screen was constructed with
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    /// Signed in: list reads and writes are allowed
    Authenticated { account_id: u64, session_id: String },
    /// No session: membership reads are skipped and writes are refused
    #[default]
    Anonymous,
}

impl Session {
    pub fn authenticated(account_id: u64, session_id: impl Into<String>) -> Self {
        Session::Authenticated {
            account_id,
            session_id: session_id.into(),
        }
    }

    /// `(account_id, session_id)` when signed in
    pub fn credentials(&self) -> Option<(u64, &str)> {
        match self {
            Session::Authenticated {
                account_id,
                session_id,
            } => Some((*account_id, session_id.as_str())),
            Session::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }
}

/// On-disk layout of the session store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionFile {
    session_id: Option<String>,
    account_id: Option<u64>,
}

/// Durable key-value store holding the session
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location, if a data directory exists
    pub fn open_default() -> Option<Self> {
        Self::default_path().map(Self::new)
    }

    /// `<data dir>/cinetui/session.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("cinetui").join("session.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the session; a missing, unreadable, or incomplete store is anonymous
    pub fn load(&self) -> Session {
        let file: SessionFile = std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default();

        match (file.account_id, file.session_id) {
            (Some(account_id), Some(session_id)) if !session_id.is_empty() => {
                Session::Authenticated {
                    account_id,
                    session_id,
                }
            }
            _ => Session::Anonymous,
        }
    }

    /// Persist a session (anonymous clears the store)
    pub fn save(&self, session: &Session) -> Result<()> {
        let file = match session {
            Session::Authenticated {
                account_id,
                session_id,
            } => SessionFile {
                session_id: Some(session_id.clone()),
                account_id: Some(*account_id),
            },
            Session::Anonymous => SessionFile::default(),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(&file)?)?;
        Ok(())
    }
}
