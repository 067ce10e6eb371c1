pub mod auth;
pub mod calendar;
pub mod items;
pub mod outfits;

use axum::Json;
use serde_json::{json, Value};

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({ "ok": true }))
}
