use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

use crate::error::SessionError;

/// How long a freshly issued session stays valid.
pub const SESSION_DURATION_HOURS: i64 = 24;

/// The signed-in user, as far as the client needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub email: String,
}

/// An authenticated session
///
/// Identified by a random v4 token and valid until `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: Uuid,
    pub user: UserRecord,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn issue(user: UserRecord, now: DateTime<Utc>, ttl: Duration) -> Self {
        Session {
            token: Uuid::new_v4(),
            user,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Session state shared by everything that needs to know who is signed in
///
/// Created once at the application root and handed (cloned) to whatever
/// needs it. Clones share the same session.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    current: Arc<RwLock<Option<Session>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        SessionContext {
            current: Arc::new(RwLock::new(Some(session))),
        }
    }

    /// Build a context from whatever `store` holds, discarding an expired
    /// session.
    pub fn restore(store: &SessionStore, now: DateTime<Utc>) -> Result<Self, SessionError> {
        match store.load()? {
            Some(session) if !session.is_expired(now) => {
                debug!("restored session for {}", session.user.username);
                Ok(Self::with_session(session))
            }
            Some(_) => {
                debug!("stored session has expired");
                Ok(Self::new())
            }
            None => Ok(Self::new()),
        }
    }

    /// Start a session for `user`, replacing any current one.
    pub fn sign_in(&self, user: UserRecord, now: DateTime<Utc>) -> Session {
        let session = Session::issue(user, now, Duration::hours(SESSION_DURATION_HOURS));
        info!("signed in as {}", session.user.username);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        session
    }

    pub fn sign_out(&self) -> Option<Session> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// The live session, if any. An expired session reads as none.
    pub fn current(&self, now: DateTime<Utc>) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|session| !session.is_expired(now))
            .cloned()
    }
}

/// JSON file holding the persisted session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        SessionStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session
    ///
    /// # Returns
    /// * `Ok(None)` - No session file exists
    /// * `Ok(Some(session))` - The stored session, expired or not
    ///
    /// # Errors
    /// * `SessionError::Io` if the file exists but cannot be read
    /// * `SessionError::Corrupt` if the file does not hold a session
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_str(&contents)?))
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Remove the stored session. Succeeds if there is none.
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user() -> UserRecord {
        UserRecord {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_sign_in_is_visible_to_clones() {
        let context = SessionContext::new();
        let shared = context.clone();

        let session = context.sign_in(user(), now());
        assert_eq!(shared.current(now()), Some(session.clone()));
        assert_eq!(session.expires_at, now() + Duration::hours(24));

        assert_eq!(shared.sign_out(), Some(session));
        assert_eq!(context.current(now()), None);
    }

    #[test]
    fn test_expired_session_reads_as_none() {
        let context = SessionContext::new();
        context.sign_in(user(), now());

        assert!(context.current(now() + Duration::hours(23)).is_some());
        assert!(context.current(now() + Duration::hours(24)).is_none());
    }

    #[test]
    fn test_issued_tokens_are_unique() {
        let a = Session::issue(user(), now(), Duration::hours(1));
        let b = Session::issue(user(), now(), Duration::hours(1));
        assert_ne!(a.token, b.token);
    }
}
