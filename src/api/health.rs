use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

pub const SERVICE: &str = "Concierge MCP Gateway";

pub async fn liveness() -> &'static str {
    "ok"
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "service": SERVICE,
    }))
}
