//! Session management for the admin area
//!
//! In-memory session storage mapping session tokens to the time they were
//! issued. There is a single admin identity, so a valid token is all a
//! session needs to carry.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Session token (UUID stored in cookie)
pub type SessionToken = String;

/// How long an admin session stays valid.
pub const SESSION_TTL: Duration = Duration::hours(12);

/// In-memory session store
///
/// Sessions are ephemeral and lost on server restart.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, DateTime<Utc>>>>,
}

impl SessionStore {
    /// Create a new empty session store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new admin session and return its token.
    pub async fn create_session(&self) -> SessionToken {
        let token = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), Utc::now());
        token
    }

    /// Whether `token` names a live session. Expired sessions are dropped.
    pub async fn is_valid(&self, token: &str) -> bool {
        self.is_valid_at(token, Utc::now()).await
    }

    async fn is_valid_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        let issued = match self.sessions.read().await.get(token) {
            Some(issued) => *issued,
            None => return false,
        };
        if now - issued < SESSION_TTL {
            return true;
        }
        self.destroy_session(token).await;
        false
    }

    /// Destroy a session
    pub async fn destroy_session(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
    }

    /// Get the number of active sessions (for debugging)
    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}
