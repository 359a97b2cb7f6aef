//! Nearby Core - Domain models, store traits, and shared types
//!
//! This crate defines the core abstractions used by the authentication subsystem:
//! - Principals (end-users and administrators) and their role tag
//! - Session and blacklist records
//! - Common error types
//! - Store traits for sessions, the blacklist, and identities
//! - Configuration management
//! - PostgreSQL and in-memory store implementations

pub mod config;
pub mod memory;
pub mod postgres;
pub mod store;

pub use config::{
    AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, ServerConfig, StorageBackend,
    MAX_ACCESS_TOKEN_TTL_SECS,
};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{Blacklist, IdentityStore, SessionStore, TokenStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors returned by the persistence layer
///
/// A timeout is reported as `DeadlineExceeded` and never folded into `NotFound`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Uniqueness conflict: {0}")]
    Conflict(String),

    #[error("Persistence deadline exceeded")]
    DeadlineExceeded,

    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Whether this error means the record is genuinely absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

// ============================================================================
// Principals
// ============================================================================

/// Role tag carried alongside a principal id
///
/// Issued into every access token so that refresh can resolve the
/// principal from the right identity store without trial lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role tag other than `user` or `admin`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown role tag: {0}")]
pub struct ParseRoleError(pub String);

impl std::str::FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

/// End-user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub image: String,
}

/// Administrator account
///
/// `role` is the administrative sub-role (e.g. "staff", "superadmin") shown to
/// the client; it is unrelated to the principal [`Role`] tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
}

/// The authenticated subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Principal {
    User(User),
    Admin(Admin),
}

impl Principal {
    pub fn id(&self) -> i64 {
        match self {
            Principal::User(u) => u.id,
            Principal::Admin(a) => a.id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Principal::User(_) => Role::User,
            Principal::Admin(_) => Role::Admin,
        }
    }

    /// Display name embedded in token claims
    pub fn name(&self) -> &str {
        match self {
            Principal::User(u) => &u.name,
            Principal::Admin(a) => &a.username,
        }
    }

    /// Email embedded in token claims (administrators have none)
    pub fn email(&self) -> &str {
        match self {
            Principal::User(u) => &u.email,
            Principal::Admin(_) => "",
        }
    }
}

/// Data for implicitly registering an end-user at login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub image: String,
}

/// Data for provisioning an administrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAdmin {
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

// ============================================================================
// Sessions and Blacklist
// ============================================================================

/// Persisted record binding a refresh token to its owner and lifecycle state
///
/// Created active; moves to inactive exactly once and never back. The owner
/// is fixed at login and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    /// The opaque refresh token value
    pub token: String,
    /// Principal the session was opened for
    pub principal_id: i64,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Append-only record of a token barred from further use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub token: String,
    pub blacklisted_at: DateTime<Utc>,
}

impl BlacklistEntry {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            blacklisted_at: Utc::now(),
        }
    }
}
