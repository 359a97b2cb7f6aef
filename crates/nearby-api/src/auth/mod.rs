//! Authentication module
//!
//! - Access token issuance and validation (HS512 JWT), refresh token generation
//! - Administrator password verification with Argon2id
//! - Principal resolution by explicit role tag
//! - The gateway orchestrating login, logout, and refresh
//! - Middleware for bearer-authenticated routes

pub mod deadline;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod resolver;
pub mod service;

pub use jwt::{Claims, JwtError, TokenIssuer};
pub use middleware::{auth_middleware, bearer_token, AuthenticatedPrincipal};
pub use password::{hash_password, Argon2Verifier, PasswordError, PasswordVerifier};
pub use resolver::PrincipalResolver;
pub use service::{
    AdminLoginRequest, AdminLoginResponse, AuthGateway, RefreshResponse, SessionTokenRequest,
    UserLoginRequest, UserLoginResponse,
};
