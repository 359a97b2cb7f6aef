//! Authentication gateway
//!
//! Orchestrates login, logout, and refresh over the token issuer, the session
//! store, the blacklist, and the identity stores. Every store call is bounded
//! by the configured persistence deadline; nothing is retried, and every
//! failure surfaces immediately.

use super::deadline::bounded;
use super::jwt::{JwtError, TokenIssuer};
use super::password::PasswordVerifier;
use super::resolver::PrincipalResolver;
use crate::audit::{audit_log, AuditEvent, ClientInfo};
use crate::error::AppError;
use crate::middleware::{record_auth_event, AuthEvent};
use nearby_core::{AppConfig, IdentityStore, NewUser, Principal, StoreError, TokenStore, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use utoipa::ToSchema;
use validator::Validate;

/// End-user login request; also registers the user on first sight
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UserLoginRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub image: String,
}

/// Administrator login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AdminLoginRequest {
    #[validate(length(min = 1, max = 255))]
    pub username: String,
    #[validate(length(min = 1, max = 1024))]
    pub password: String,
}

/// Logout and refresh body; `token` is always the opaque refresh token
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SessionTokenRequest {
    #[validate(length(min = 1, max = 255))]
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserLoginResponse {
    pub user_id: i64,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginResponse {
    /// Administrative sub-role
    pub role: String,
    pub admin_id: i64,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Access and refresh token pair bound to a freshly persisted session
struct OpenedSession {
    id: i64,
    access_token: String,
    refresh_token: String,
}

fn token_failure(err: JwtError) -> AppError {
    AppError::Internal(format!("token generation failed: {err}"))
}

/// Session lifecycle orchestration
///
/// Holds no per-request state and is shared by every handler.
pub struct AuthGateway {
    sessions: Arc<dyn TokenStore>,
    identities: Arc<dyn IdentityStore>,
    passwords: Arc<dyn PasswordVerifier>,
    issuer: TokenIssuer,
    resolver: PrincipalResolver,
    timeout: Duration,
}

impl AuthGateway {
    pub fn new(
        config: &AppConfig,
        sessions: Arc<dyn TokenStore>,
        identities: Arc<dyn IdentityStore>,
        passwords: Arc<dyn PasswordVerifier>,
    ) -> Self {
        let timeout = Duration::from_secs(config.database.query_timeout_secs);
        Self {
            sessions,
            resolver: PrincipalResolver::new(identities.clone(), timeout),
            identities,
            passwords,
            issuer: TokenIssuer::new(&config.auth),
            timeout,
        }
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Probe the session store under the persistence deadline
    pub async fn ping(&self) -> Result<(), StoreError> {
        bounded(self.timeout, self.sessions.ping()).await
    }

    /// Log in an end-user, registering them if the email is unknown
    ///
    /// Every call opens a new independent session.
    pub async fn login_user(
        &self,
        request: &UserLoginRequest,
        client: &ClientInfo,
    ) -> Result<UserLoginResponse, AppError> {
        let user = self.find_or_register(request, client).await?;
        let principal = Principal::User(user);
        let session = self.open_session(&principal).await?;

        audit_log(&AuditEvent::LoginSuccess {
            principal_id: principal.id(),
            role: principal.role().to_string(),
            session_id: session.id,
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
        });
        record_auth_event(AuthEvent::UserLogin);

        Ok(UserLoginResponse {
            user_id: principal.id(),
            access_token: session.access_token,
            refresh_token: session.refresh_token,
        })
    }

    /// Log in an administrator by username and password
    ///
    /// An unknown username and a wrong password are indistinguishable to the
    /// caller.
    pub async fn login_admin(
        &self,
        request: &AdminLoginRequest,
        client: &ClientInfo,
    ) -> Result<AdminLoginResponse, AppError> {
        let admin = match bounded(
            self.timeout,
            self.identities.find_admin_by_username(&request.username),
        )
        .await
        {
            Ok(admin) => admin,
            Err(StoreError::NotFound(_)) => {
                return Err(self.reject_login(&request.username, "unknown administrator", client))
            }
            Err(e) => return Err(e.into()),
        };

        let passwords = self.passwords.clone();
        let stored_hash = admin.password_hash.clone();
        let candidate = request.password.clone();
        let comparison =
            tokio::task::spawn_blocking(move || passwords.compare(&stored_hash, &candidate))
                .await
                .map_err(|e| AppError::Internal(format!("password check aborted: {e}")))?;

        let matches = match comparison {
            Ok(matches) => matches,
            Err(e) => {
                warn!(admin_id = admin.id, error = %e, "Stored password hash could not be verified");
                false
            }
        };
        if !matches {
            return Err(self.reject_login(&request.username, "password mismatch", client));
        }

        let role = admin.role.clone();
        let principal = Principal::Admin(admin);
        let session = self.open_session(&principal).await?;

        audit_log(&AuditEvent::LoginSuccess {
            principal_id: principal.id(),
            role: principal.role().to_string(),
            session_id: session.id,
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
        });
        record_auth_event(AuthEvent::AdminLogin);

        Ok(AdminLoginResponse {
            role,
            admin_id: principal.id(),
            access_token: session.access_token,
            refresh_token: session.refresh_token,
        })
    }

    /// Close the active session identified by `refresh_token`
    ///
    /// The refresh token and, when it verifies, the presented access token
    /// are blacklisted in the same unit as the deactivation. A second logout
    /// with the same refresh token finds no active session.
    pub async fn logout(
        &self,
        refresh_token: &str,
        access_token: Option<&str>,
        client: &ClientInfo,
    ) -> Result<(), AppError> {
        let session = match bounded(
            self.timeout,
            self.sessions.find_active_session_by_token(refresh_token),
        )
        .await
        {
            Ok(session) => session,
            Err(StoreError::NotFound(_)) => {
                return Err(self.reject_logout("session not found", client));
            }
            Err(e) => return Err(e.into()),
        };

        let mut tokens = vec![refresh_token.to_string()];
        if let Some(token) = access_token {
            match self.issuer.verify_signature(token) {
                Ok(_) => tokens.push(token.to_string()),
                Err(e) => debug!(error = %e, "Ignoring unverifiable access token on logout"),
            }
        }
        let access_token_revoked = tokens.len() > 1;

        bounded(self.timeout, self.sessions.revoke_session(session.id, &tokens))
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => self.reject_logout("session not found", client),
                other => other.into(),
            })?;

        audit_log(&AuditEvent::Logout {
            session_id: session.id,
            access_token_revoked,
            ip_address: client.ip_address.clone(),
        });
        record_auth_event(AuthEvent::Logout);

        Ok(())
    }

    /// Mint a new access token for the principal behind `access_token`
    ///
    /// Check order: session exists, neither token is blacklisted, session is
    /// active, access token signature verifies (an elapsed `exp` is
    /// tolerated), and the token's subject and role own the session. The
    /// refresh token is not rotated.
    pub async fn refresh(
        &self,
        access_token: &str,
        refresh_token: &str,
        client: &ClientInfo,
    ) -> Result<RefreshResponse, AppError> {
        let session = match bounded(
            self.timeout,
            self.sessions.find_session_by_token(refresh_token),
        )
        .await
        {
            Ok(session) => session,
            Err(StoreError::NotFound(_)) => {
                return Err(self.reject_refresh("invalid token", None, client));
            }
            Err(e) => return Err(e.into()),
        };

        for token in [access_token, refresh_token] {
            if self.is_blacklisted(token).await? {
                return Err(self.reject_refresh("token blacklisted", Some(session.id), client));
            }
        }

        if !session.active {
            return Err(self.reject_refresh("session inactive", Some(session.id), client));
        }

        let claims = self.issuer.verify_signature(access_token).map_err(|e| {
            debug!(error = %e, "Refresh presented an unverifiable access token");
            self.reject_refresh("invalid token", Some(session.id), client)
        })?;

        let id = claims
            .subject_id()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let role = claims.role().map_err(|e| AppError::Internal(e.to_string()))?;

        // The access token must belong to the principal the session was opened for
        if (id, role) != (session.principal_id, session.role) {
            warn!(
                session_id = session.id,
                "Refresh paired a session with another principal's access token"
            );
            return Err(self.reject_refresh("invalid token", Some(session.id), client));
        }

        let principal = self.resolver.resolve(id, role).await.map_err(|e| match e {
            StoreError::NotFound(msg) => {
                AppError::Internal(format!("token subject could not be loaded: {msg}"))
            }
            other => other.into(),
        })?;

        let access_token = self
            .issuer
            .generate_access_token(&principal)
            .map_err(token_failure)?;

        audit_log(&AuditEvent::TokenRefresh {
            principal_id: principal.id(),
            role: principal.role().to_string(),
            session_id: session.id,
            ip_address: client.ip_address.clone(),
        });
        record_auth_event(AuthEvent::Refresh);

        Ok(RefreshResponse { access_token })
    }

    /// Resolve the principal behind a live, non-blacklisted access token
    pub async fn authenticate(&self, access_token: &str) -> Result<Principal, AppError> {
        let claims = self.issuer.validate_token(access_token).map_err(|e| match e {
            JwtError::ExpiredToken => AppError::Authentication("Token has expired".to_string()),
            _ => AppError::Authentication("Invalid token".to_string()),
        })?;

        if self.is_blacklisted(access_token).await? {
            return Err(AppError::Authentication(
                "Token has been revoked".to_string(),
            ));
        }

        let id = claims
            .subject_id()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let role = claims.role().map_err(|e| AppError::Internal(e.to_string()))?;

        self.resolver.resolve(id, role).await.map_err(|e| match e {
            StoreError::NotFound(_) => AppError::Authentication("Unknown principal".to_string()),
            other => other.into(),
        })
    }

    async fn is_blacklisted(&self, token: &str) -> Result<bool, AppError> {
        match bounded(self.timeout, self.sessions.find_blacklisted_token(token)).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_or_register(
        &self,
        request: &UserLoginRequest,
        client: &ClientInfo,
    ) -> Result<User, AppError> {
        match bounded(self.timeout, self.identities.find_user_by_email(&request.email)).await {
            Ok(user) => return Ok(user),
            Err(StoreError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let new_user = NewUser {
            name: request.name.clone(),
            email: request.email.clone(),
            image: request.image.clone(),
        };

        match bounded(self.timeout, self.identities.create_user(&new_user)).await {
            Ok(id) => {
                audit_log(&AuditEvent::UserRegistered {
                    user_id: id,
                    email: new_user.email.clone(),
                    ip_address: client.ip_address.clone(),
                });
                Ok(User {
                    id,
                    name: new_user.name,
                    email: new_user.email,
                    image: new_user.image,
                })
            }
            // A concurrent first login registered the same email
            Err(StoreError::Conflict(_)) => Ok(bounded(
                self.timeout,
                self.identities.find_user_by_email(&request.email),
            )
            .await?),
            Err(e) => Err(e.into()),
        }
    }

    /// Mint both tokens, then persist the session
    ///
    /// Minting first means a signing or entropy failure never leaves a
    /// session behind.
    async fn open_session(&self, principal: &Principal) -> Result<OpenedSession, AppError> {
        let access_token = self
            .issuer
            .generate_access_token(principal)
            .map_err(token_failure)?;
        let refresh_token = self.issuer.generate_refresh_token().map_err(token_failure)?;

        let id = bounded(
            self.timeout,
            self.sessions
                .create_session(&refresh_token, principal.id(), principal.role()),
        )
        .await?;

        Ok(OpenedSession {
            id,
            access_token,
            refresh_token,
        })
    }

    fn reject_login(&self, username: &str, reason: &str, client: &ClientInfo) -> AppError {
        audit_log(&AuditEvent::LoginFailure {
            username: username.to_string(),
            reason: reason.to_string(),
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
        });
        record_auth_event(AuthEvent::LoginRejected);
        AppError::Authentication("Invalid credentials".to_string())
    }

    fn reject_logout(&self, reason: &str, client: &ClientInfo) -> AppError {
        audit_log(&AuditEvent::LogoutRejected {
            reason: reason.to_string(),
            ip_address: client.ip_address.clone(),
        });
        record_auth_event(AuthEvent::LogoutRejected);
        AppError::NotFound("Session not found".to_string())
    }

    fn reject_refresh(&self, reason: &str, session_id: Option<i64>, client: &ClientInfo) -> AppError {
        audit_log(&AuditEvent::RefreshRejected {
            reason: reason.to_string(),
            session_id,
            ip_address: client.ip_address.clone(),
        });
        record_auth_event(AuthEvent::RefreshRejected);
        AppError::Forbidden(reason.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::{hash_password_with_config, Argon2Verifier, PasswordConfig};
    use nearby_core::{Blacklist, MemoryStore, NewAdmin, Role, SessionStore};

    fn gateway_with(store: &MemoryStore) -> AuthGateway {
        let shared = Arc::new(store.clone());
        AuthGateway::new(
            &AppConfig::default(),
            shared.clone(),
            shared,
            Arc::new(Argon2Verifier),
        )
    }

    fn alice() -> UserLoginRequest {
        UserLoginRequest {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            image: String::new(),
        }
    }

    async fn seed_admin(store: &MemoryStore, username: &str, password: &str) -> i64 {
        let config = PasswordConfig {
            memory_cost: 8192,
            time_cost: 1,
            parallelism: 1,
            output_len: Some(32),
        };
        store
            .create_admin(&NewAdmin {
                username: username.to_string(),
                password_hash: hash_password_with_config(password, &config).unwrap(),
                role: "superadmin".to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_registers_once() {
        let store = MemoryStore::new();
        let gateway = gateway_with(&store);
        let client = ClientInfo::default();

        let first = gateway.login_user(&alice(), &client).await.unwrap();
        let second = gateway.login_user(&alice(), &client).await.unwrap();

        assert_eq!(first.user_id, second.user_id);
        assert_ne!(first.refresh_token, second.refresh_token);
        assert_eq!(store.session_count().await, 2);
    }

    #[tokio::test]
    async fn test_logout_is_exactly_once() {
        let store = MemoryStore::new();
        let gateway = gateway_with(&store);
        let client = ClientInfo::default();
        let login = gateway.login_user(&alice(), &client).await.unwrap();

        gateway
            .logout(&login.refresh_token, Some(&login.access_token), &client)
            .await
            .unwrap();
        assert!(store.find_blacklisted_token(&login.access_token).await.is_ok());
        assert!(store.find_blacklisted_token(&login.refresh_token).await.is_ok());

        let second = gateway.logout(&login.refresh_token, None, &client).await;
        assert!(matches!(second, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_logout_ignores_forged_access_token() {
        let store = MemoryStore::new();
        let gateway = gateway_with(&store);
        let client = ClientInfo::default();
        let login = gateway.login_user(&alice(), &client).await.unwrap();

        gateway
            .logout(&login.refresh_token, Some("forged.token.value"), &client)
            .await
            .unwrap();
        assert_eq!(store.blacklist_len().await, 1);
    }

    #[tokio::test]
    async fn test_refresh_rejects_blacklisted_access_token() {
        let store = MemoryStore::new();
        let gateway = gateway_with(&store);
        let client = ClientInfo::default();
        let login = gateway.login_user(&alice(), &client).await.unwrap();

        store.blacklist_token(&login.access_token).await.unwrap();

        let result = gateway
            .refresh(&login.access_token, &login.refresh_token, &client)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(msg)) if msg == "token blacklisted"));
    }

    #[tokio::test]
    async fn test_refresh_requires_active_session() {
        let store = MemoryStore::new();
        let gateway = gateway_with(&store);
        let client = ClientInfo::default();
        let login = gateway.login_user(&alice(), &client).await.unwrap();

        let session = store
            .find_session_by_token(&login.refresh_token)
            .await
            .unwrap();
        store.deactivate_session(session.id).await.unwrap();

        let result = gateway
            .refresh(&login.access_token, &login.refresh_token, &client)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(msg)) if msg == "session inactive"));
    }

    #[tokio::test]
    async fn test_refresh_unknown_session_is_forbidden() {
        let gateway = gateway_with(&MemoryStore::new());
        let result = gateway
            .refresh("a.b.c", "no-such-refresh-token", &ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(msg)) if msg == "invalid token"));
    }

    #[tokio::test]
    async fn test_refresh_accepts_expired_access_token() {
        let store = MemoryStore::new();
        let gateway = gateway_with(&store);
        let client = ClientInfo::default();
        let login = gateway.login_user(&alice(), &client).await.unwrap();

        let principal = gateway
            .authenticate(&login.access_token)
            .await
            .unwrap();
        let stale = gateway
            .issuer()
            .generate_access_token_at(&principal, 1_000)
            .unwrap();

        let refreshed = gateway
            .refresh(&stale, &login.refresh_token, &client)
            .await
            .unwrap();
        let claims = gateway.issuer().validate_token(&refreshed.access_token).unwrap();
        assert_eq!(claims.subject_id().unwrap(), login.user_id);
    }

    #[tokio::test]
    async fn test_admin_login_and_refresh_keeps_role() {
        let store = MemoryStore::new();
        let gateway = gateway_with(&store);
        let client = ClientInfo::default();
        let admin_id = seed_admin(&store, "root", "hunter2").await;
        // A user sharing the admin's numeric id
        let user = gateway.login_user(&alice(), &client).await.unwrap();
        assert_eq!(user.user_id, admin_id);

        let login = gateway
            .login_admin(
                &AdminLoginRequest {
                    username: "root".to_string(),
                    password: "hunter2".to_string(),
                },
                &client,
            )
            .await
            .unwrap();
        assert_eq!(login.role, "superadmin");

        let refreshed = gateway
            .refresh(&login.access_token, &login.refresh_token, &client)
            .await
            .unwrap();
        let claims = gateway.issuer().validate_token(&refreshed.access_token).unwrap();
        assert_eq!(claims.subject_id().unwrap(), admin_id);
        assert_eq!(claims.role().unwrap(), Role::Admin);
        assert_eq!(claims.name, "root");
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token_of_another_user() {
        let store = MemoryStore::new();
        let gateway = gateway_with(&store);
        let client = ClientInfo::default();
        let alice = gateway.login_user(&alice(), &client).await.unwrap();
        let bob = gateway
            .login_user(
                &UserLoginRequest {
                    name: "Bob".to_string(),
                    email: "b@x.com".to_string(),
                    image: String::new(),
                },
                &client,
            )
            .await
            .unwrap();

        let result = gateway
            .refresh(&alice.access_token, &bob.refresh_token, &client)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(msg)) if msg == "invalid token"));

        // Bob's own pair still works
        assert!(gateway
            .refresh(&bob.access_token, &bob.refresh_token, &client)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_refresh_rejects_stale_admin_token_on_user_session() {
        let store = MemoryStore::new();
        let gateway = gateway_with(&store);
        let client = ClientInfo::default();
        seed_admin(&store, "root", "hunter2").await;

        let admin = gateway
            .login_admin(
                &AdminLoginRequest {
                    username: "root".to_string(),
                    password: "hunter2".to_string(),
                },
                &client,
            )
            .await
            .unwrap();
        let principal = gateway.authenticate(&admin.access_token).await.unwrap();
        // Logout without a bearer leaves the access token off the blacklist
        gateway
            .logout(&admin.refresh_token, None, &client)
            .await
            .unwrap();
        let stale = gateway
            .issuer()
            .generate_access_token_at(&principal, 1_000)
            .unwrap();

        let user = gateway
            .login_user(
                &UserLoginRequest {
                    name: "Mallory".to_string(),
                    email: "m@x.com".to_string(),
                    image: String::new(),
                },
                &client,
            )
            .await
            .unwrap();

        let result = gateway.refresh(&stale, &user.refresh_token, &client).await;
        assert!(matches!(result, Err(AppError::Forbidden(msg)) if msg == "invalid token"));
    }

    #[tokio::test]
    async fn test_refresh_rejects_same_id_with_other_role() {
        let store = MemoryStore::new();
        let gateway = gateway_with(&store);
        let client = ClientInfo::default();
        let admin_id = seed_admin(&store, "root", "hunter2").await;
        let user = gateway.login_user(&alice(), &client).await.unwrap();
        assert_eq!(user.user_id, admin_id);

        let admin = gateway
            .login_admin(
                &AdminLoginRequest {
                    username: "root".to_string(),
                    password: "hunter2".to_string(),
                },
                &client,
            )
            .await
            .unwrap();

        let result = gateway
            .refresh(&admin.access_token, &user.refresh_token, &client)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(msg)) if msg == "invalid token"));
    }

    #[tokio::test]
    async fn test_admin_wrong_password_creates_nothing() {
        let store = MemoryStore::new();
        let gateway = gateway_with(&store);
        seed_admin(&store, "root", "hunter2").await;

        let result = gateway
            .login_admin(
                &AdminLoginRequest {
                    username: "root".to_string(),
                    password: "wrong".to_string(),
                },
                &ClientInfo::default(),
            )
            .await;

        assert!(matches!(result, Err(AppError::Authentication(msg)) if msg == "Invalid credentials"));
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_admin_with_malformed_hash_is_rejected() {
        let store = MemoryStore::new();
        let gateway = gateway_with(&store);
        store
            .create_admin(&NewAdmin {
                username: "legacy".to_string(),
                password_hash: "plaintext".to_string(),
                role: "staff".to_string(),
            })
            .await
            .unwrap();

        let result = gateway
            .login_admin(
                &AdminLoginRequest {
                    username: "legacy".to_string(),
                    password: "plaintext".to_string(),
                },
                &ClientInfo::default(),
            )
            .await;
        assert!(matches!(result, Err(AppError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_revoked_token() {
        let store = MemoryStore::new();
        let gateway = gateway_with(&store);
        let client = ClientInfo::default();
        let login = gateway.login_user(&alice(), &client).await.unwrap();

        assert_eq!(
            gateway.authenticate(&login.access_token).await.unwrap().id(),
            login.user_id
        );

        gateway
            .logout(&login.refresh_token, Some(&login.access_token), &client)
            .await
            .unwrap();
        assert!(matches!(
            gateway.authenticate(&login.access_token).await,
            Err(AppError::Authentication(_))
        ));
    }
}
