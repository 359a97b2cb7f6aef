//! Test utilities for driving the router against an in-memory store
//!
//! Enabled for integration tests through the `test-utils` feature.

use crate::auth::password::{hash_password_with_config, PasswordConfig};
use crate::create_router;
use crate::state::AppState;
use axum::Router;
use nearby_core::{AppConfig, IdentityStore, MemoryStore, NewAdmin, StorageBackend};
use std::sync::Arc;

/// Router, its state, and direct access to the backing store
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub store: MemoryStore,
}

/// Default configuration pointed at the in-memory backend
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.backend = StorageBackend::Memory;
    config.auth.jwt_secret = "test-secret".to_string();
    config
}

pub fn spawn_test_app() -> TestApp {
    let (state, store) = AppState::in_memory(test_config());
    let state = Arc::new(state);
    TestApp {
        router: create_router(state.clone()),
        state,
        store,
    }
}

pub fn create_router_for_testing() -> Router {
    spawn_test_app().router
}

/// Provision an administrator with a cheap Argon2id hash
pub async fn seed_admin(store: &MemoryStore, username: &str, password: &str, role: &str) -> i64 {
    let config = PasswordConfig {
        memory_cost: 8192,
        time_cost: 1,
        parallelism: 1,
        output_len: Some(32),
    };
    let password_hash = match hash_password_with_config(password, &config) {
        Ok(hash) => hash,
        Err(e) => panic!("failed to hash test password: {e}"),
    };

    match store
        .create_admin(&NewAdmin {
            username: username.to_string(),
            password_hash,
            role: role.to_string(),
        })
        .await
    {
        Ok(id) => id,
        Err(e) => panic!("failed to seed admin: {e}"),
    }
}
