//! Authentication API handlers
//!
//! Thin HTTP adapters over [`AuthGateway`](crate::auth::AuthGateway): parse
//! and validate the body, pick the bearer token out of the headers, and shape
//! the gateway's result into a response.
//!
//! Author: hephaex@gmail.com

use crate::audit::ClientInfo;
use crate::auth::{
    bearer_token, AdminLoginRequest, AdminLoginResponse, AuthenticatedPrincipal, RefreshResponse,
    SessionTokenRequest, UserLoginRequest, UserLoginResponse,
};
use crate::error::AppError;
use crate::extract::ValidatedJson;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Plain message response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// The principal behind the presented access token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PrincipalInfo {
    pub id: i64,
    /// "user" or "admin"
    pub role: String,
    pub name: String,
    pub email: String,
}

/// Auth route status
#[utoipa::path(
    get,
    path = "/v1/auth",
    tag = "auth",
    responses(
        (status = 200, description = "Auth routes are mounted", body = MessageResponse),
    )
)]
pub async fn auth_status() -> impl IntoResponse {
    Json(MessageResponse::new("Auth route is up and running!"))
}

/// Log in an end-user
///
/// Registers the user on first login by email. Every call opens a new session.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "auth",
    request_body = UserLoginRequest,
    responses(
        (status = 201, description = "Session opened", body = UserLoginResponse),
        (status = 400, description = "Invalid request body", body = crate::error::ApiError),
        (status = 409, description = "Session token collision", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn user_login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<UserLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let client = ClientInfo::from_headers(&headers);
    let response = state.gateway.login_user(&request, &client).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in an administrator
#[utoipa::path(
    post,
    path = "/v1/auth/admin/login",
    tag = "auth",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Session opened", body = AdminLoginResponse),
        (status = 400, description = "Invalid request body", body = crate::error::ApiError),
        (status = 401, description = "Invalid credentials", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn admin_login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<AdminLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let client = ClientInfo::from_headers(&headers);
    let response = state.gateway.login_admin(&request, &client).await?;

    Ok(Json(response))
}

/// Close a session
///
/// `token` is the refresh token. A bearer access token, if supplied, is
/// blacklisted along with it.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "auth",
    request_body = SessionTokenRequest,
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse),
        (status = 400, description = "Invalid request body", body = crate::error::ApiError),
        (status = 404, description = "Session not found", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<SessionTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let client = ClientInfo::from_headers(&headers);
    state
        .gateway
        .logout(&request.token, bearer_token(&headers), &client)
        .await?;

    Ok(Json(MessageResponse::new("Logout successful")))
}

/// Mint a new access token
///
/// Requires the current (possibly expired) access token as bearer and the
/// refresh token in the body.
#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    tag = "auth",
    request_body = SessionTokenRequest,
    responses(
        (status = 200, description = "Access token refreshed", body = RefreshResponse),
        (status = 400, description = "Invalid request body or missing bearer", body = crate::error::ApiError),
        (status = 403, description = "Invalid or blacklisted token", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<SessionTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let access_token = bearer_token(&headers).ok_or_else(|| {
        AppError::Validation("Authorization: Bearer <accessToken> is required".to_string())
    })?;
    let client = ClientInfo::from_headers(&headers);

    let response = state
        .gateway
        .refresh(access_token, &request.token, &client)
        .await?;

    Ok(Json(response))
}

/// Current principal
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Authenticated principal", body = PrincipalInfo),
        (status = 401, description = "Missing, invalid, expired, or revoked token", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me_handler(
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
) -> impl IntoResponse {
    Json(PrincipalInfo {
        id: principal.id(),
        role: principal.role().to_string(),
        name: principal.name().to_string(),
        email: principal.email().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_uses_camel_case() {
        let response = UserLoginResponse {
            user_id: 1,
            access_token: "a.b.c".to_string(),
            refresh_token: "r".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["userId"], 1);
        assert_eq!(json["accessToken"], "a.b.c");
        assert_eq!(json["refreshToken"], "r");
    }

    #[test]
    fn test_admin_response_shape() {
        let response = AdminLoginResponse {
            role: "staff".to_string(),
            admin_id: 3,
            access_token: "a.b.c".to_string(),
            refresh_token: "r".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["adminId"], 3);
        assert_eq!(json["role"], "staff");
    }
}
