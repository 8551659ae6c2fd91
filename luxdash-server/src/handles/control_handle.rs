use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use axum_extra::extract::WithRejection;
use luxdash_api::{ControlRequest, ControlResponse};

use crate::errors::ApiError;
use crate::services::{BrightnessPlan, CommandService, ControlLoop};

#[derive(Clone)]
pub struct ControlState {
    pub command_service: Arc<CommandService>,
    pub control_loop: Arc<ControlLoop>,
}

/// Apply explicit group levels. Partial lamp failures still answer `200`
/// with `ok: false`. The dashboard snapshot is refreshed right after.
pub async fn control_lights(
    State(state): State<ControlState>,
    WithRejection(Json(body), _): WithRejection<Json<ControlRequest>, ApiError>,
) -> Result<Json<ControlResponse>, ApiError> {
    let plan = BrightnessPlan::from_request(&body);
    let response = state.command_service.apply_brightness(&plan).await?;
    state.control_loop.request_poll();

    if !response.ok {
        tracing::warn!(
            "{} of {} lights rejected the command",
            response.devices.iter().filter(|d| !d.ok).count(),
            response.devices.len()
        );
    }

    Ok(Json(response))
}
