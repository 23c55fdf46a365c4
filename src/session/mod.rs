// src/session/mod.rs — Auth token + cached user record
//
// The session store is the only owner of the persisted session. The request
// dispatcher reads the token; login writes both keys, logout clears them.

pub mod kv;

use std::path::Path;

use crate::infra::errors::SelfcareError;
use crate::models::UserRecord;
use crate::profile::ProfileName;
use kv::{FileStore, KeyValueStore, MemoryStore};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const REMEMBER_KEY: &str = "remember";
pub const OVERRIDE_KEY: &str = "api_mode_override";

/// An authenticated session: both halves are present or there is no session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserRecord,
}

pub struct SessionStore {
    kv: Box<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(kv: impl KeyValueStore + 'static) -> Self {
        Self { kv: Box::new(kv) }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Open (or lazily create) the JSON session file at `path`.
    pub fn open(path: &Path) -> Self {
        Self::new(FileStore::open(path))
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.kv.get(key) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key, "Session store read failed: {e}");
                None
            }
        }
    }

    pub fn get_token(&self) -> Option<String> {
        self.read(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Cached user record. An undecodable record reads as absent.
    pub fn get_user(&self) -> Option<UserRecord> {
        let raw = self.read(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Ignoring unreadable cached user record: {e}");
                None
            }
        }
    }

    /// The current session, if both token and user record are stored.
    pub fn get_session(&self) -> Option<Session> {
        let token = self.get_token()?;
        let user = self.get_user()?;
        Some(Session { token, user })
    }

    /// Persist token and user in one write.
    pub fn set_session(&self, token: &str, user: &UserRecord) -> Result<(), SelfcareError> {
        let user_json = serde_json::to_string(user)?;
        self.kv
            .set_many(&[(USER_KEY, user_json.as_str()), (TOKEN_KEY, token)])?;
        tracing::info!(phone = %user.phone, "Session stored");
        Ok(())
    }

    /// Remove the session and the remember flag. Safe without a session.
    pub fn clear(&self) -> Result<(), SelfcareError> {
        self.kv.remove_many(&[TOKEN_KEY, USER_KEY, REMEMBER_KEY])?;
        tracing::info!("Session cleared");
        Ok(())
    }

    pub fn remember(&self) -> bool {
        self.read(REMEMBER_KEY).as_deref() == Some("true")
    }

    pub fn set_remember(&self, remember: bool) -> Result<(), SelfcareError> {
        if remember {
            self.kv.set(REMEMBER_KEY, "true")
        } else {
            self.kv.remove(REMEMBER_KEY)
        }
    }

    /// Raw pinned profile name, as stored.
    pub fn environment_override(&self) -> Option<String> {
        self.read(OVERRIDE_KEY).filter(|v| !v.is_empty())
    }

    pub fn set_environment_override(&self, name: ProfileName) -> Result<(), SelfcareError> {
        self.kv.set(OVERRIDE_KEY, name.as_str())
    }

    pub fn clear_environment_override(&self) -> Result<(), SelfcareError> {
        self.kv.remove(OVERRIDE_KEY)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.get_token().is_some())
            .finish()
    }
}
