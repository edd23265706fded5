use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::{Value, json};

use crate::axum_http::error_responses::ApiResponse;

pub async fn health_check() -> impl IntoResponse {
    ApiResponse::ok(json!({ "status": "ok" }))
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<Value> {
            success: false,
            message: None,
            data: None,
            error: Some("Route not found".to_string()),
        }),
    )
}
