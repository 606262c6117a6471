// ============================
// crates/backend-lib/src/handlers/pages.rs
// ============================
//! Static page shells and the liveness probe.
//!
//! HTML rendering lives with the presentation layer; these endpoints only
//! expose the data it binds.
use axum::Json;

/// Liveness probe
pub async fn health() -> &'static str {
    "ok"
}

/// Homepage shell
pub async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "title": "Crypto Investment" }))
}

/// Registration form shell
pub async fn register_form() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "title": "Register" }))
}

/// Login form shell
pub async fn login_form() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "title": "Login" }))
}
