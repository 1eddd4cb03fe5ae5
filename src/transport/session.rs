//! Session context
//!
//! The access and refresh tokens live in a `SessionHandle` that is created
//! once and passed explicitly to every client that needs authentication.
//! Signing in begins a session, refreshing replaces it and signing out
//! clears it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Token pair issued by the auth API
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub refresh_token: String,
}

impl Session {
    pub fn new(token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Session known only by its access token (e.g. passed on the command line)
    pub fn from_access_token(token: impl Into<String>) -> Self {
        Self::new(token, String::new())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("has_refresh_token", &!self.refresh_token.is_empty())
            .finish()
    }
}

/// Shared, explicitly passed session context
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that starts with an active session
    pub fn with_session(session: Session) -> Self {
        let handle = Self::new();
        handle.begin(session);
        handle
    }

    /// Start a session after login
    pub fn begin(&self, session: Session) {
        tracing::debug!("session started");
        self.set(Some(session));
    }

    /// Swap in a refreshed token pair
    pub fn replace(&self, session: Session) {
        tracing::debug!("session refreshed");
        self.set(Some(session));
    }

    /// Drop the session on logout
    pub fn clear(&self) {
        tracing::debug!("session cleared");
        self.set(None);
    }

    pub fn current(&self) -> Option<Session> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.current().map(|s| s.token)
    }

    pub fn is_active(&self) -> bool {
        self.current().is_some()
    }

    fn set(&self, session: Option<Session>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = session;
    }
}
