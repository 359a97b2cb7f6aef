//! OpenAPI document served at `/api-docs/openapi.json`
//!
//! Author: hephaex@gmail.com

use crate::auth::{
    AdminLoginRequest, AdminLoginResponse, RefreshResponse, SessionTokenRequest, UserLoginRequest,
    UserLoginResponse,
};
use crate::error::ApiError;
use crate::handlers::auth::{MessageResponse, PrincipalInfo};
use crate::handlers::health::{HealthResponse, ReadinessChecks, ReadinessResponse};
use axum::{response::IntoResponse, Json};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Nearby Auth API",
        description = "Session lifecycle for end-users and administrators: login, logout, and access token refresh",
        license(name = "Apache-2.0")
    ),
    paths(
        crate::handlers::health::health_check,
        crate::handlers::health::readiness_check,
        crate::handlers::auth::auth_status,
        crate::handlers::auth::user_login_handler,
        crate::handlers::auth::admin_login_handler,
        crate::handlers::auth::logout_handler,
        crate::handlers::auth::refresh_handler,
        crate::handlers::auth::me_handler,
    ),
    components(
        schemas(
            UserLoginRequest,
            UserLoginResponse,
            AdminLoginRequest,
            AdminLoginResponse,
            SessionTokenRequest,
            RefreshResponse,
            MessageResponse,
            PrincipalInfo,
            HealthResponse,
            ReadinessResponse,
            ReadinessChecks,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Login, logout, and refresh"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_auth_paths() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();

        for path in [
            "/v1/auth/login",
            "/v1/auth/admin/login",
            "/v1/auth/logout",
            "/v1/auth/refresh",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
        assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
    }
}
