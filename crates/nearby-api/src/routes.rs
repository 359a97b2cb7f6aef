//! API route definitions
//!
//! Author: hephaex@gmail.com

use crate::auth::middleware::auth_middleware;
use crate::handlers::auth;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Routes mounted under `/v1/auth`
pub fn auth_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Session lifecycle routes carry their own token checks
    let public_routes = Router::new()
        .route("/", get(auth::auth_status))
        .route("/login", post(auth::user_login_handler))
        .route("/admin/login", post(auth::admin_login_handler))
        .route("/logout", post(auth::logout_handler))
        .route("/refresh", post(auth::refresh_handler));

    let protected_routes = Router::new()
        .route("/me", get(auth::me_handler))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
