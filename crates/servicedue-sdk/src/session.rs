//! Signed-in session and its on-disk store.
//!
//! A [`Session`] is an explicit value handed to the client; nothing in the
//! SDK reads it from ambient state. [`SessionStore`] persists it between
//! runs with a fixed lifecycle:
//!
//! * `save` after a successful sign-in or sign-up,
//! * `clear` at sign-out or when the backend answers `401`,
//! * `load` at startup, which discards the file once the session expired.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use servicedue_models::{AuthResponse, User};
use tracing::{debug, info};

use crate::error::SdkError;

const APP_DIR: &str = "servicedue";
const SESSION_FILE: &str = "session.json";

/// Bearer token plus the user it belongs to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub auth_token: String,
    pub user: User,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Session for a fresh authentication response, valid for `ttl` from now.
    pub fn new(auth: AuthResponse, ttl: TimeDelta) -> Self {
        Self::issued_at(auth, Utc::now(), ttl)
    }

    /// Session issued at a given instant.
    pub fn issued_at(auth: AuthResponse, issued_at: DateTime<Utc>, ttl: TimeDelta) -> Self {
        Self {
            auth_token: auth.token,
            user: auth.user,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// JSON file holding at most one [`Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store at `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the user's config directory (`servicedue/session.json`).
    pub fn default_location() -> Result<Self, SdkError> {
        let dir = dirs::config_dir()
            .ok_or_else(|| SdkError::Config("could not determine config directory".into()))?;
        Ok(Self::at(dir.join(APP_DIR).join(SESSION_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session.
    ///
    /// `Ok(None)` when nobody is signed in. An expired session is removed
    /// and reported as [`SdkError::SessionExpired`].
    pub fn load(&self) -> Result<Option<Session>, SdkError> {
        self.load_at(Utc::now())
    }

    /// [`Self::load`] evaluated at `now`.
    pub fn load_at(&self, now: DateTime<Utc>) -> Result<Option<Session>, SdkError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let session: Session = serde_json::from_str(&content)?;
        if session.is_expired_at(now) {
            info!(path = %self.path.display(), expired_at = %session.expires_at, "session expired");
            self.clear()?;
            return Err(SdkError::SessionExpired);
        }
        debug!(user = %session.user.email, "loaded session");
        Ok(Some(session))
    }

    /// Load the session, failing when nobody is signed in.
    pub fn require(&self) -> Result<Session, SdkError> {
        self.load()?.ok_or(SdkError::NotSignedIn)
    }

    /// Persist `session`, replacing any previous one.
    pub fn save(&self, session: &Session) -> Result<(), SdkError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json)?;
        restrict_permissions(&self.path)?;
        info!(path = %self.path.display(), user = %session.user.email, "saved session");
        Ok(())
    }

    /// Remove the stored session. Returns whether one existed.
    pub fn clear(&self) -> Result<bool, SdkError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "cleared session");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
