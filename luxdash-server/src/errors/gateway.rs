use axum::http::StatusCode;

/// Missing configuration that makes a whole gateway call impossible.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("vendor API credential is not configured")]
    MissingCredential,

    #[error("no sensor or light device ids are configured")]
    MissingDeviceIds,

    #[error("no light device ids are configured")]
    MissingLightIds,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
