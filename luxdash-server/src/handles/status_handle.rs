use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use luxdash_api::StatusResponse;

use crate::errors::ApiError;
use crate::services::StatusService;

#[derive(Clone)]
pub struct StatusState {
    pub status_service: Arc<StatusService>,
}

/// Fresh readings straight from the vendor, bypassing the poll cache.
pub async fn get_status(State(state): State<StatusState>) -> Result<Json<StatusResponse>, ApiError> {
    let status = state.status_service.fetch_status().await?;

    Ok(Json(status))
}
