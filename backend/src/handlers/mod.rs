use axum::{http::StatusCode, response::Json};
use serde_json::json;

pub mod analytics;
pub mod tickets;

pub use analytics::analytics_routes;
pub use tickets::ticket_routes;

pub async fn health_check() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({"status": "healthy", "service": "triage-api"})),
    )
}
