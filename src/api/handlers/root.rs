use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Fitdesk API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Gym membership management system",
        "status": "operational",
        "endpoints": {
            "health": "/health",
            "auth": "/api/auth",
            "members": "/api/members",
            "analytics": "/api/analytics",
            "diet": "/api/diet"
        }
    }))
}

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339()
        })),
    )
}
