use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum CalculatorError {
    #[error("failed to start calculator: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("calculator exited with {code:?}: {stderr}")]
    Exit { code: Option<i32>, stderr: String },

    #[error("calculator timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("calculator returned empty output")]
    EmptyOutput,

    #[error("calculator returned malformed output: {0}")]
    Malformed(String),
}

impl CalculatorError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
