use sqlx::PgPool;

use crate::AuthConfig;

/// Shared state handed to every API router.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// Token-issuance configuration.
    pub auth: AuthConfig,
}

impl AppState {
    /// Creates application state from a connection pool and auth configuration.
    pub fn new(pool: PgPool, auth: AuthConfig) -> Self {
        Self { pool, auth }
    }
}
