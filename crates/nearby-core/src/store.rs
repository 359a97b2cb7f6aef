//! Store traits for sessions, the token blacklist, and identities
//!
//! Implementations must be safe to share across request handlers; every
//! method is called under a request-scoped deadline by the caller.

use async_trait::async_trait;

use crate::{Admin, BlacklistEntry, NewAdmin, NewUser, Result, Role, Session, User};

/// Refresh-token-backed session records
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new active session for `token`, owned by `(principal_id, role)`
    ///
    /// A duplicate token yields `StoreError::Conflict`.
    async fn create_session(&self, token: &str, principal_id: i64, role: Role) -> Result<i64>;

    /// Find a session by token regardless of its active flag
    async fn find_session_by_token(&self, token: &str) -> Result<Session>;

    /// Find a session by token, only if it is still active
    async fn find_active_session_by_token(&self, token: &str) -> Result<Session>;

    /// Mark a session inactive
    ///
    /// Deactivating an already inactive session succeeds.
    async fn deactivate_session(&self, session_id: i64) -> Result<()>;
}

/// Append-only registry of tokens that must never authorize a refresh again
#[async_trait]
pub trait Blacklist: Send + Sync {
    /// Record `token`; recording it twice is a no-op
    async fn blacklist_token(&self, token: &str) -> Result<()>;

    async fn find_blacklisted_token(&self, token: &str) -> Result<BlacklistEntry>;
}

/// Combined session + blacklist store with an atomic revocation step
#[async_trait]
pub trait TokenStore: SessionStore + Blacklist {
    /// Deactivate `session_id` and blacklist every token in `tokens` as one unit
    async fn revoke_session(&self, session_id: i64, tokens: &[String]) -> Result<()>;

    /// Cheap reachability probe used by readiness checks
    async fn ping(&self) -> Result<()>;
}

/// End-user and administrator identity stores
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_user_by_id(&self, id: i64) -> Result<User>;

    async fn find_user_by_email(&self, email: &str) -> Result<User>;

    async fn find_admin_by_id(&self, id: i64) -> Result<Admin>;

    async fn find_admin_by_username(&self, username: &str) -> Result<Admin>;

    async fn create_user(&self, user: &NewUser) -> Result<i64>;

    async fn create_admin(&self, admin: &NewAdmin) -> Result<i64>;
}
