//! Application state management
//!
//! Author: hephaex@gmail.com

use crate::auth::{Argon2Verifier, AuthGateway, PasswordVerifier};
use anyhow::Context;
use nearby_core::{AppConfig, IdentityStore, MemoryStore, PgStore, StorageBackend, TokenStore};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
///
/// Built once at startup; nothing in it is mutated afterwards.
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Session lifecycle orchestration
    pub gateway: AuthGateway,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Assemble state over explicit stores
    pub fn new(
        config: AppConfig,
        sessions: Arc<dyn TokenStore>,
        identities: Arc<dyn IdentityStore>,
        passwords: Arc<dyn PasswordVerifier>,
    ) -> Self {
        let gateway = AuthGateway::new(&config, sessions, identities, passwords);
        Self {
            config: Arc::new(config),
            gateway,
            start_time: Instant::now(),
        }
    }

    /// State over a fresh in-memory store
    pub fn in_memory(config: AppConfig) -> (Self, MemoryStore) {
        let store = MemoryStore::new();
        let shared = Arc::new(store.clone());
        let state = Self::new(config, shared.clone(), shared, Arc::new(Argon2Verifier));
        (state, store)
    }

    /// Connect to the configured backend and assemble state
    ///
    /// For PostgreSQL the schema is created if missing.
    pub async fn connect(config: AppConfig) -> anyhow::Result<Self> {
        match config.database.backend {
            StorageBackend::Postgres => {
                let store = PgStore::new(&config.database.postgres_url, config.database.pool_size)
                    .await
                    .context("Failed to connect to PostgreSQL")?;
                store
                    .ensure_schema()
                    .await
                    .context("Failed to apply schema")?;

                let shared = Arc::new(store);
                Ok(Self::new(
                    config,
                    shared.clone(),
                    shared,
                    Arc::new(Argon2Verifier),
                ))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory store; sessions are lost on restart");
                Ok(Self::in_memory(config).0)
            }
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
