use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Platform-wide counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_donors: i64,
    pub active_requests: i64,
    pub fulfilled_requests: i64,
    pub total_facilities: i64,
}

/// Returns platform-wide counters.
async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<PlatformStats>, (StatusCode, &'static str)> {
    let mut tx = state.pool.begin().await.map_err(|_e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to begin transaction",
        )
    })?;

    match crate::sql::stats::platform(&mut tx).await {
        Ok(stats) => {
            tx.commit().await.map_err(|_e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to commit transaction",
                )
            })?;
            Ok(Json(stats))
        }
        Err(_) => Err((StatusCode::INTERNAL_SERVER_ERROR, "failed to gather stats")),
    }
}

/// Creates an Axum router with the stats endpoint.
///
/// # Routes
/// - `GET /stats` - Platform-wide counters
pub fn create_stats_router(state: AppState) -> Router {
    Router::new()
        .route("/stats", get(get_stats))
        .with_state(state)
}
