use axum::{extract::Extension, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    message: String,
    status: String,
    timestamp: String,
    database: String,
}

/// Health check endpoint
///
/// Probes database connectivity with a bounded timeout. Returns 200 OK when
/// the database answers, 503 Service Unavailable otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let db_ok = matches!(
        tokio::time::timeout(
            std::time::Duration::from_secs(5),
            sqlx::query("SELECT 1").execute(&state.db_pool),
        )
        .await,
        Ok(Ok(_))
    );

    let (status_code, status, database) = if db_ok {
        (StatusCode::OK, "running", "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "error")
    };

    (
        status_code,
        Json(HealthResponse {
            message: "AR CyberGuard API".to_string(),
            status: status.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            database: database.to_string(),
        }),
    )
}
