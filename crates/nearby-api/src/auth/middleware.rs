//! Authentication middleware for protecting routes
//!
//! Extracts the bearer access token, validates it against the gateway
//! (signature, expiry, blacklist), and adds the resolved principal to the
//! request extensions.

use crate::audit::{audit_log, AuditEvent, ClientInfo};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use nearby_core::Principal;
use std::sync::Arc;

/// Principal attached to requests that passed [`auth_middleware`]
///
/// Extract in handlers with `Extension<AuthenticatedPrincipal>`.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal(pub Principal);

/// Return the token of an `Authorization: Bearer <token>` header
///
/// `None` when the header is missing, not UTF-8, uses another scheme, or
/// carries an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication middleware that requires a valid, non-revoked access token
///
/// # Usage
///
/// ```ignore
/// use axum::{middleware, routing::get, Router};
///
/// let app = Router::new()
///     .route("/me", get(me_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
/// ```
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = match bearer_token(request.headers()) {
        Some(token) => token.to_string(),
        None => {
            return Err(AppError::Authentication(
                "Missing or invalid Authorization header".to_string(),
            ))
        }
    };

    let principal = match state.gateway.authenticate(&token).await {
        Ok(principal) => principal,
        Err(AppError::Authentication(reason)) => {
            let client = ClientInfo::from_headers(request.headers());
            audit_log(&AuditEvent::InvalidToken {
                reason: reason.clone(),
                ip_address: client.ip_address,
                user_agent: client.user_agent,
            });
            return Err(AppError::Authentication(reason));
        }
        Err(e) => return Err(e),
    };

    request
        .extensions_mut()
        .insert(AuthenticatedPrincipal(principal));

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers_with("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
