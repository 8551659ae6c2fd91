pub mod api;
pub mod calculator;
pub mod control;
pub mod gateway;
pub mod registry;
pub mod vendor;

pub use api::ApiError;
pub use calculator::CalculatorError;
pub use control::SequenceError;
pub use gateway::GatewayError;
pub use registry::RegistryError;
pub use vendor::{StatusParseError, VendorError};

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, extra) = match self {
            ApiError::GatewayError(e) => {
                tracing::error!("Gateway configuration error: {}", e);
                (e.status_code(), e.to_string(), None)
            }
            ApiError::CalculatorError(e) => {
                tracing::error!("Brightness calculation failed: {}", e);
                (
                    e.status_code(),
                    String::from("Brightness calculation failed"),
                    Some(("detail", e.to_string())),
                )
            }
            ApiError::InvalidRequest(message) => (StatusCode::BAD_REQUEST, message, None),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found"), None),
            ApiError::InternalError(e) => {
                let error_id = Uuid::new_v4();
                tracing::error!(error_id = ?error_id, "Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(("error_id", error_id.to_string())),
                )
            }
        };

        let mut error_obj = json!({
            "code": status.as_u16(),
            "message": error_message
        });

        if let Some((key, value)) = extra {
            error_obj[key] = json!(value);
        }

        let body = Json(json!({
            "error": error_obj
        }));

        (status, body).into_response()
    }
}
