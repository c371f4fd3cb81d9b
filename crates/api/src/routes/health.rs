//! `GET /health`: liveness plus database reachability and schema version.
//!
//! Answers 200 when the database responds and 503 otherwise, so load
//! balancers can drain an instance that lost its database.

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Upper bound on the database round trip. The pool itself would keep
/// retrying a refused connection for its whole acquire timeout.
const DB_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: &'static str,
    pub version: &'static str,
    pub database: DatabaseHealth,
}

#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DatabaseHealth {
    Up {
        /// Newest applied migration.
        schema_version: Option<i64>,
    },
    Unreachable,
}

async fn check_database(pool: &propgo_db::DbPool) -> DatabaseHealth {
    match tokio::time::timeout(DB_CHECK_TIMEOUT, propgo_db::schema_version(pool)).await {
        Ok(Ok(schema_version)) => DatabaseHealth::Up { schema_version },
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Health check query failed");
            DatabaseHealth::Unreachable
        }
        Err(_) => {
            tracing::warn!(timeout = ?DB_CHECK_TIMEOUT, "Health check timed out");
            DatabaseHealth::Unreachable
        }
    }
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = check_database(&state.pool).await;
    let (code, status) = match database {
        DatabaseHealth::Up { .. } => (StatusCode::OK, "ok"),
        DatabaseHealth::Unreachable => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        database,
    };
    (code, Json(body))
}

/// Mounted at the root, outside `/api`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
