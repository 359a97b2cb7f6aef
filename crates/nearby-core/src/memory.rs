//! In-memory store
//!
//! Mirrors the PostgreSQL store's uniqueness and idempotency rules. Used for
//! local development (`STORAGE_BACKEND=memory`) and tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::store::{Blacklist, IdentityStore, SessionStore, TokenStore};
use crate::{Admin, BlacklistEntry, NewAdmin, NewUser, Result, Role, Session, StoreError, User};

#[derive(Default)]
struct MemoryState {
    sessions: Vec<Session>,
    blacklist: HashMap<String, BlacklistEntry>,
    users: Vec<User>,
    admins: Vec<Admin>,
}

impl MemoryState {
    fn deactivate(&mut self, session_id: i64) -> Result<()> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| StoreError::NotFound(format!("session {session_id}")))?;
        session.active = false;
        Ok(())
    }

    fn blacklist(&mut self, token: &str) {
        self.blacklist
            .entry(token.to_string())
            .or_insert_with(|| BlacklistEntry::new(token));
    }
}

/// Process-local store guarded by a single async mutex
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions ever created
    pub async fn session_count(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    /// Number of blacklisted tokens
    pub async fn blacklist_len(&self) -> usize {
        self.state.lock().await.blacklist.len()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, token: &str, principal_id: i64, role: Role) -> Result<i64> {
        let mut state = self.state.lock().await;
        if state.sessions.iter().any(|s| s.token == token) {
            return Err(StoreError::Conflict("session token already exists".to_string()));
        }

        let id = state.sessions.len() as i64 + 1;
        state.sessions.push(Session {
            id,
            token: token.to_string(),
            principal_id,
            role,
            active: true,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn find_session_by_token(&self, token: &str) -> Result<Session> {
        let state = self.state.lock().await;
        state
            .sessions
            .iter()
            .find(|s| s.token == token)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("session".to_string()))
    }

    async fn find_active_session_by_token(&self, token: &str) -> Result<Session> {
        let state = self.state.lock().await;
        state
            .sessions
            .iter()
            .find(|s| s.token == token && s.active)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("active session".to_string()))
    }

    async fn deactivate_session(&self, session_id: i64) -> Result<()> {
        self.state.lock().await.deactivate(session_id)
    }
}

#[async_trait]
impl Blacklist for MemoryStore {
    async fn blacklist_token(&self, token: &str) -> Result<()> {
        self.state.lock().await.blacklist(token);
        Ok(())
    }

    async fn find_blacklisted_token(&self, token: &str) -> Result<BlacklistEntry> {
        let state = self.state.lock().await;
        state
            .blacklist
            .get(token)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("blacklist entry".to_string()))
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn revoke_session(&self, session_id: i64, tokens: &[String]) -> Result<()> {
        let mut state = self.state.lock().await;
        state.deactivate(session_id)?;
        for token in tokens {
            state.blacklist(token);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_user_by_id(&self, id: i64) -> Result<User> {
        let state = self.state.lock().await;
        state
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<User> {
        let state = self.state.lock().await;
        state
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("user".to_string()))
    }

    async fn find_admin_by_id(&self, id: i64) -> Result<Admin> {
        let state = self.state.lock().await;
        state
            .admins
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("admin {id}")))
    }

    async fn find_admin_by_username(&self, username: &str) -> Result<Admin> {
        let state = self.state.lock().await;
        state
            .admins
            .iter()
            .find(|a| a.username == username)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("admin".to_string()))
    }

    async fn create_user(&self, user: &NewUser) -> Result<i64> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }

        let id = state.users.len() as i64 + 1;
        state.users.push(User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            image: user.image.clone(),
        });
        Ok(id)
    }

    async fn create_admin(&self, admin: &NewAdmin) -> Result<i64> {
        let mut state = self.state.lock().await;
        if state.admins.iter().any(|a| a.username == admin.username) {
            return Err(StoreError::Conflict("username already taken".to_string()));
        }

        let id = state.admins.len() as i64 + 1;
        state.admins.push(Admin {
            id,
            username: admin.username.clone(),
            password_hash: admin.password_hash.clone(),
            role: admin.role.clone(),
        });
        Ok(id)
    }
}
