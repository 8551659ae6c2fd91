use axum::extract::rejection::JsonRejection;

use super::{CalculatorError, GatewayError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Gateway error: {0}")]
    GatewayError(#[from] GatewayError),

    #[error("Calculator error: {0}")]
    CalculatorError(#[from] CalculatorError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}
