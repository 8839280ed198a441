use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

/// GET /health
/// Returns a simple status object with service version and server time.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "pathfinder-api"
    }))
}
