use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Check {
    Ok,
    Error,
}

#[derive(Debug, Serialize)]
struct HealthReport {
    status: &'static str,
    version: &'static str,
    checks: BTreeMap<&'static str, Check>,
}

/// Health check handler
///
/// Degraded when the tool server is disconnected or the database does not
/// answer a ping.
pub async fn health_handler(State(state): State<AppState>) -> Response {
    let mcp_server = if state.catalog.is_connected() { Check::Ok } else { Check::Error };
    let sqlite = match state.store.ping().await {
        Ok(()) => Check::Ok,
        Err(e) => {
            tracing::warn!(error = %e, "database health check failed");
            Check::Error
        }
    };

    let checks = BTreeMap::from([("mcp_server", mcp_server), ("sqlite", sqlite)]);
    let healthy = checks.values().all(|check| *check == Check::Ok);

    let report = HealthReport {
        status: if healthy { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        checks,
    };
    let status = if healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (status, Json(report)).into_response()
}
