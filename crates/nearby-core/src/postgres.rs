//! PostgreSQL store
//!
//! Provides session, blacklist, and identity persistence using SQLx and PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;

use crate::store::{Blacklist, IdentityStore, SessionStore, TokenStore};
use crate::{Admin, BlacklistEntry, NewAdmin, NewUser, Result, Role, Session, StoreError, User};

/// Schema statements, applied in order by [`PgStore::ensure_schema`]
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        image TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS admins (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'staff',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        id BIGSERIAL PRIMARY KEY,
        token TEXT NOT NULL UNIQUE,
        principal_id BIGINT NOT NULL,
        role TEXT NOT NULL,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    // Sessions created before ownership was recorded match no principal
    "ALTER TABLE sessions ADD COLUMN IF NOT EXISTS principal_id BIGINT NOT NULL DEFAULT 0",
    "ALTER TABLE sessions ADD COLUMN IF NOT EXISTS role TEXT NOT NULL DEFAULT 'user'",
    r#"
    CREATE TABLE IF NOT EXISTS token_blacklist (
        token TEXT PRIMARY KEY,
        blacklisted_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store connection
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Database(format!("PostgreSQL connection failed: {e}")))?;

        Ok(Self { pool })
    }

    /// Create from an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the tables this store relies on if they are missing
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(*statement)
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("Failed to apply schema", e))?;
        }
        tracing::info!("authentication schema is up to date");
        Ok(())
    }
}

/// Map a driver error, promoting unique violations to `Conflict`
fn db_error(context: &str, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(format!("{context}: {db}"))
        }
        _ => StoreError::Database(format!("{context}: {err}")),
    }
}

#[derive(Debug, FromRow)]
struct SessionRow {
    id: i64,
    token: String,
    principal_id: i64,
    role: String,
    active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for Session {
    type Error = StoreError;

    fn try_from(row: SessionRow) -> Result<Self> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e| StoreError::Database(format!("session {}: {e}", row.id)))?;

        Ok(Session {
            id: row.id,
            token: row.token,
            principal_id: row.principal_id,
            role,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

const SESSION_COLUMNS: &str = "id, token, principal_id, role, active, created_at";

#[derive(Debug, FromRow)]
struct BlacklistRow {
    token: String,
    blacklisted_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    image: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            image: row.image,
        }
    }
}

#[derive(Debug, FromRow)]
struct AdminRow {
    id: i64,
    username: String,
    password_hash: String,
    role: String,
}

impl From<AdminRow> for Admin {
    fn from(row: AdminRow) -> Self {
        Admin {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            role: row.role,
        }
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn create_session(&self, token: &str, principal_id: i64, role: Role) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            "INSERT INTO sessions (token, principal_id, role, active) VALUES ($1, $2, $3, TRUE) RETURNING id",
        )
        .bind(token)
        .bind(principal_id)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create session", e))?;

        Ok(row.0)
    }

    async fn find_session_by_token(&self, token: &str) -> Result<Session> {
        let row: Option<SessionRow> =
            sqlx::query_as(&format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE token = $1"))
                .bind(token)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to fetch session", e))?;

        row.ok_or_else(|| StoreError::NotFound("session".to_string()))?
            .try_into()
    }

    async fn find_active_session_by_token(&self, token: &str) -> Result<Session> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE token = $1 AND active = TRUE"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch active session", e))?;

        row.ok_or_else(|| StoreError::NotFound("active session".to_string()))?
            .try_into()
    }

    async fn deactivate_session(&self, session_id: i64) -> Result<()> {
        let result = sqlx::query("UPDATE sessions SET active = FALSE WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to deactivate session", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("session {session_id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl Blacklist for PgStore {
    async fn blacklist_token(&self, token: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO token_blacklist (token, blacklisted_at) VALUES ($1, NOW()) ON CONFLICT (token) DO NOTHING",
        )
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to blacklist token", e))?;

        Ok(())
    }

    async fn find_blacklisted_token(&self, token: &str) -> Result<BlacklistEntry> {
        let row: Option<BlacklistRow> =
            sqlx::query_as("SELECT token, blacklisted_at FROM token_blacklist WHERE token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to check blacklist", e))?;

        row.map(|r| BlacklistEntry {
            token: r.token,
            blacklisted_at: r.blacklisted_at,
        })
        .ok_or_else(|| StoreError::NotFound("blacklist entry".to_string()))
    }
}

#[async_trait]
impl TokenStore for PgStore {
    async fn revoke_session(&self, session_id: i64, tokens: &[String]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to open transaction", e))?;

        let result = sqlx::query("UPDATE sessions SET active = FALSE WHERE id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to deactivate session", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("session {session_id}")));
        }

        for token in tokens {
            sqlx::query(
                "INSERT INTO token_blacklist (token, blacklisted_at) VALUES ($1, NOW()) ON CONFLICT (token) DO NOTHING",
            )
            .bind(token)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to blacklist token", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit revocation", e))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Ping failed", e))?;
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn find_user_by_id(&self, id: i64) -> Result<User> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, name, email, image FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to fetch user", e))?;

        row.map(User::from)
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<User> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, name, email, image FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to fetch user", e))?;

        row.map(User::from)
            .ok_or_else(|| StoreError::NotFound("user".to_string()))
    }

    async fn find_admin_by_id(&self, id: i64) -> Result<Admin> {
        let row: Option<AdminRow> =
            sqlx::query_as("SELECT id, username, password_hash, role FROM admins WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to fetch admin", e))?;

        row.map(Admin::from)
            .ok_or_else(|| StoreError::NotFound(format!("admin {id}")))
    }

    async fn find_admin_by_username(&self, username: &str) -> Result<Admin> {
        let row: Option<AdminRow> = sqlx::query_as(
            "SELECT id, username, password_hash, role FROM admins WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch admin", e))?;

        row.map(Admin::from)
            .ok_or_else(|| StoreError::NotFound("admin".to_string()))
    }

    async fn create_user(&self, user: &NewUser) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            "INSERT INTO users (name, email, image) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.image)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create user", e))?;

        Ok(row.0)
    }

    async fn create_admin(&self, admin: &NewAdmin) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            "INSERT INTO admins (username, password_hash, role) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&admin.username)
        .bind(&admin.password_hash)
        .bind(&admin.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create admin", e))?;

        Ok(row.0)
    }
}
