/// Failure of a single vendor request.
#[derive(Debug, thiserror::Error)]
pub enum VendorError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("vendor responded {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed status document: {0}")]
    Parse(#[from] StatusParseError),
}

#[derive(Debug, thiserror::Error)]
pub enum StatusParseError {
    #[error("status body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(String),
}
