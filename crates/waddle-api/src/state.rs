//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use waddle_auth::{PasswordHasher, SessionAuthority};
use waddle_core::config::AppConfig;
use waddle_database::DatabasePool;
use waddle_database::repositories::UserRepository;
use waddle_realtime::Hub;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool
    pub db: DatabasePool,
    /// User repository
    pub users: Arc<UserRepository>,
    /// Session authority (token issuance, liveness, revocation)
    pub sessions: Arc<SessionAuthority>,
    /// Password hasher (Argon2)
    pub passwords: PasswordHasher,
    /// WebSocket connection hub
    pub hub: Hub,
}

impl AppState {
    /// Assembles the state from its long-lived components.
    pub fn new(
        config: AppConfig,
        db: DatabasePool,
        sessions: Arc<SessionAuthority>,
        hub: Hub,
    ) -> Self {
        let users = Arc::new(UserRepository::new(db.pool().clone()));
        Self {
            config: Arc::new(config),
            db,
            users,
            sessions,
            passwords: PasswordHasher::new(),
            hub,
        }
    }
}
