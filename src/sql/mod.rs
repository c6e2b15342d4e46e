//! PostgreSQL database operations for hemolink.
//!
//! This module provides functions for interacting with the PostgreSQL database,
//! organized by table. Every function takes an open transaction; handlers own
//! the begin/commit boundary.

use crate::StoreError;

/// Result type for database operations.
pub type SqlResult<T> = Result<T, StoreError>;

/// User rows, including donor matching.
pub mod user;

/// Blood request rows.
pub mod blood_request;

/// Medical facility rows.
pub mod facility;

/// Donation history rows.
pub mod donation;

/// Platform-wide counters.
pub mod stats;

#[cfg(test)]
/// Test utilities for PostgreSQL database operations.
pub mod tests {
    use sqlx::PgPool;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    /// Creates a unique, fully-migrated database for one test.
    ///
    /// The name combines the process id, a nanosecond timestamp, and an
    /// atomic counter, so concurrent tests never collide. Connects to
    /// `TEST_DATABASE_URL` (or a local `hemolink_test` default), creates the
    /// database, applies the embedded migrations, and returns a pool bound
    /// to it.
    pub async fn setup_test_db() -> PgPool {
        let base_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/hemolink_test".to_string());

        let pid = std::process::id();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("hemolink_test_{}_{}_{}", pid, timestamp, counter);

        let mut parsed_url = url::Url::parse(&base_url).expect("Invalid database URL");

        let admin_pool = PgPool::connect(&base_url)
            .await
            .expect("Failed to connect to test database");

        sqlx::query(&format!("CREATE DATABASE {}", db_name))
            .execute(&admin_pool)
            .await
            .expect("Failed to create test database");

        admin_pool.close().await;

        parsed_url.set_path(&format!("/{}", db_name));
        let test_db_url = parsed_url.as_str();

        let pool = PgPool::connect(test_db_url)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }
}
