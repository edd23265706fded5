use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::usecases::orders::OrderError;

/// Envelope shared by every route: { success, message?, data?, error? }.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: None,
            data: Some(data),
            error: None,
        })
    }

    pub fn ok_with_message(message: &str, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.to_string()),
            data: Some(data),
            error: None,
        })
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (error, data) = match &self {
            // Conflicts carry a structured payload so the client can offer a renewal.
            OrderError::Conflict(conflict) => {
                (self.to_string(), serde_json::to_value(conflict).ok())
            }
            // Don't leak internal error detail to the client
            OrderError::Internal(_) => ("Internal server error".to_string(), None),
            other => (other.to_string(), None),
        };

        let body = Json(ApiResponse::<Value> {
            success: false,
            message: None,
            data,
            error: Some(error),
        });

        (status, body).into_response()
    }
}
