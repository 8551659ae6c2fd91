use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use axum_extra::extract::WithRejection;
use luxdash_api::{ControlLoopStatus, Preset, SetpointRequest};

use crate::errors::ApiError;
use crate::services::ControlLoop;

#[derive(Clone)]
pub struct SetpointState {
    pub control_loop: Arc<ControlLoop>,
    pub presets: Arc<Vec<Preset>>,
}

pub async fn get_setpoint(State(state): State<SetpointState>) -> Json<ControlLoopStatus> {
    Json(state.control_loop.status().await)
}

/// Non-numeric targets count as `0`; out of range targets are clamped.
pub async fn update_setpoint(
    State(state): State<SetpointState>,
    WithRejection(Json(body), _): WithRejection<Json<SetpointRequest>, ApiError>,
) -> Json<ControlLoopStatus> {
    let target = state
        .control_loop
        .set_target(body.target_illuminance.value());

    tracing::info!("setpoint updated to {} lx", target);

    Json(state.control_loop.status().await)
}

pub async fn get_presets(State(state): State<SetpointState>) -> Json<Vec<Preset>> {
    Json(state.presets.as_ref().clone())
}

pub async fn apply_preset(
    Path(mode): Path<String>,
    State(state): State<SetpointState>,
) -> Result<Json<ControlLoopStatus>, ApiError> {
    let preset = state
        .presets
        .iter()
        .find(|preset| preset.mode == mode)
        .ok_or_else(|| ApiError::NotFound(format!("Preset `{mode}`")))?;

    let target = state.control_loop.set_target(preset.lux);
    tracing::info!("preset {} applied at {} lx", preset.mode, target);

    Ok(Json(state.control_loop.status().await))
}
