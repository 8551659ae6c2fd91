use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use axum_extra::extract::WithRejection;
use luxdash_api::{clamp_target, CalculateRequest, CalculateResponse};

use crate::errors::ApiError;
use crate::services::BrightnessCalculator;

#[derive(Clone)]
pub struct CalculateState {
    pub calculator: Arc<dyn BrightnessCalculator>,
}

pub async fn calculate_brightness(
    State(state): State<CalculateState>,
    WithRejection(Json(body), _): WithRejection<Json<CalculateRequest>, ApiError>,
) -> Result<Json<CalculateResponse>, ApiError> {
    let requested = body.target_illuminance.value();
    if requested.is_nan() {
        return Err(ApiError::InvalidRequest(String::from(
            "targetIlluminance must be a number",
        )));
    }

    let target = clamp_target(requested);
    if target != requested {
        tracing::debug!("target {} lx clamped to {} lx", requested, target);
    }

    let levels = state.calculator.calculate(target).await?;

    Ok(Json(levels))
}
