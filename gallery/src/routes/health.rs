use axum::Json;
use serde::Serialize;

/// Liveness report of the gallery process
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    semver: String,
    /// `GIT_REV` baked in at build time
    rev: Option<String>,
}

/// Reports the gallery as up along with the running build
///
/// Touches neither the image bucket nor the likes table, so it stays green while
/// a storage backend is degraded.
pub async fn handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        semver: env!("CARGO_PKG_VERSION").to_string(),
        rev: option_env!("GIT_REV").map(ToString::to_string),
    })
}
