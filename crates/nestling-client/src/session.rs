//! Durable session state.
//!
//! The session credential (bearer token plus the signed-in user) is the
//! only durable client state. [`FileSessionStore`] is the production
//! store; [`MemorySessionStore`] backs tests. All credential mutation
//! funnels through [`SessionStore`]; nothing else writes the token.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use nestling_models::User;

use crate::error::Result;

/// Environment variable to override the Nestling state directory.
const NESTLING_DIR_ENV: &str = "NESTLING_DIR";
const NESTLING_DIR: &str = ".nestling";
const SESSION_FILE: &str = "session.json";

/// Persisted session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// May be absent when only a token was obtained (e.g. a refresh
    /// before any user record was stored).
    #[serde(default)]
    pub user: Option<User>,
    pub access_token: String,
}

/// Session-state collaborator consumed by the gateway.
pub trait SessionStore: Send + Sync {
    /// Current bearer token, if signed in.
    fn access_token(&self) -> Option<String>;

    /// Current user record, if one is stored.
    fn current_user(&self) -> Option<User>;

    /// Persist a fresh credential together with its user.
    fn set_session(&self, user: User, access_token: String);

    /// Replace the token, keeping any stored user record.
    fn set_access_token(&self, access_token: String);

    /// Erase all session state.
    fn clear(&self);
}

/// In-memory store for tests and ephemeral use.
#[derive(Default)]
pub struct MemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(access_token: impl Into<String>) -> Self {
        Self {
            session: RwLock::new(Some(Session {
                user: None,
                access_token: access_token.into(),
            })),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    fn current_user(&self) -> Option<User> {
        self.session
            .read()
            .as_ref()
            .and_then(|session| session.user.clone())
    }

    fn set_session(&self, user: User, access_token: String) {
        *self.session.write() = Some(Session {
            user: Some(user),
            access_token,
        });
    }

    fn set_access_token(&self, access_token: String) {
        let mut guard = self.session.write();
        let user = guard.as_ref().and_then(|session| session.user.clone());
        *guard = Some(Session { user, access_token });
    }

    fn clear(&self) {
        *self.session.write() = None;
    }
}

/// File-backed store at `~/.nestling/session.json`.
///
/// A missing or corrupt file reads as signed-out; persistence failures
/// are logged, not raised, so a read-only disk degrades to an in-memory
/// session rather than breaking every request.
pub struct FileSessionStore {
    path: PathBuf,
    cached: RwLock<Option<Session>>,
}

impl FileSessionStore {
    /// Open the store at its default location, honoring `NESTLING_DIR`.
    pub fn open_default() -> Result<Self> {
        Ok(Self::open(default_session_path()?))
    }

    /// Open the store at an explicit path.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cached = RwLock::new(load_session(&path));
        Self { path, cached }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, session: Option<&Session>) {
        match session {
            Some(session) => {
                if let Some(parent) = self.path.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }
                match serde_json::to_string_pretty(session) {
                    Ok(json) => {
                        if let Err(err) = std::fs::write(&self.path, json) {
                            tracing::warn!(
                                path = %self.path.display(),
                                error = %err,
                                "failed to persist session"
                            );
                        }
                    }
                    Err(err) => tracing::warn!(error = %err, "failed to serialize session"),
                }
            }
            None => {
                if self.path.exists()
                    && let Err(err) = std::fs::remove_file(&self.path)
                {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %err,
                        "failed to remove session file"
                    );
                }
            }
        }
    }
}

impl SessionStore for FileSessionStore {
    fn access_token(&self) -> Option<String> {
        self.cached
            .read()
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    fn current_user(&self) -> Option<User> {
        self.cached
            .read()
            .as_ref()
            .and_then(|session| session.user.clone())
    }

    fn set_session(&self, user: User, access_token: String) {
        let mut guard = self.cached.write();
        *guard = Some(Session {
            user: Some(user),
            access_token,
        });
        self.persist(guard.as_ref());
    }

    fn set_access_token(&self, access_token: String) {
        let mut guard = self.cached.write();
        let user = guard.as_ref().and_then(|session| session.user.clone());
        *guard = Some(Session { user, access_token });
        self.persist(guard.as_ref());
    }

    fn clear(&self) {
        let mut guard = self.cached.write();
        *guard = None;
        self.persist(None);
    }
}

fn load_session(path: &Path) -> Option<Session> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Resolve the session file path.
/// Priority: NESTLING_DIR env var > ~/.nestling/
fn default_session_path() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(NESTLING_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir).join(SESSION_FILE));
    }
    dirs::home_dir()
        .map(|home| home.join(NESTLING_DIR).join(SESSION_FILE))
        .ok_or_else(|| std::io::Error::other("failed to determine home directory").into())
}
