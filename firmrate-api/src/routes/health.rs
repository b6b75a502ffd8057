/// Health check endpoint
///
/// `GET /health` — liveness probe that also pings the database. Returns
/// 200 with component status either way so load balancers can read the
/// body, not just the code.

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status ("ok" or "degraded")
    pub status: String,

    /// Database connectivity ("ok" or "unavailable")
    pub database: String,

    /// Server version
    pub version: String,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match firmrate_shared::db::pool::health_check(&state.db).await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unavailable");
            "unavailable"
        }
    };

    let status = if database == "ok" { "ok" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        database: database.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
