use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::{AdminId, AuthError};

/// Issues and resolves bearer tokens.
pub trait TokenAuthority: Send + Sync {
    fn issue(&self, admin: AdminId) -> String;
    fn authenticate(&self, token: &str) -> Result<AdminId, AuthError>;
}

#[derive(Debug, Clone, Copy)]
struct Session {
    admin: AdminId,
    expires_at: DateTime<Utc>,
}

/// Opaque random tokens kept in process memory with a fixed lifetime.
#[derive(Debug)]
pub struct SessionTokens {
    ttl: Duration,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionTokens {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_ttl_minutes(minutes: i64) -> Self {
        Self::new(Duration::minutes(minutes))
    }

    pub fn issue_at(&self, admin: AdminId, now: DateTime<Utc>) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, session| session.expires_at > now);
        sessions.insert(
            token.clone(),
            Session {
                admin,
                expires_at: now + self.ttl,
            },
        );
        token
    }

    pub fn authenticate_at(&self, token: &str, now: DateTime<Utc>) -> Result<AdminId, AuthError> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        match sessions.get(token).copied() {
            Some(session) if session.expires_at > now => Ok(session.admin),
            Some(_) => {
                sessions.remove(token);
                Err(AuthError::InvalidToken)
            }
            None => Err(AuthError::InvalidToken),
        }
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl TokenAuthority for SessionTokens {
    fn issue(&self, admin: AdminId) -> String {
        self.issue_at(admin, Utc::now())
    }

    fn authenticate(&self, token: &str) -> Result<AdminId, AuthError> {
        self.authenticate_at(token, Utc::now())
    }
}
