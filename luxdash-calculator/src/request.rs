use luxdash_api::GroupLevels;
use serde::Deserialize;

use crate::curve::CompensationCurve;

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("malformed input: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("target illuminance must be a non-negative number, got {0}")]
    InvalidTarget(f64),
}

/// Process payload, passed as the sole argument.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculatorInput {
    #[serde(rename = "targetIlluminance", alias = "targetLux")]
    pub target_illuminance: f64,
}

/// Parse a process payload and run it through the curve.
pub fn calculate_from_json(
    curve: &CompensationCurve,
    payload: &str,
) -> Result<GroupLevels<u8>, InputError> {
    let input: CalculatorInput = serde_json::from_str(payload)?;

    if !input.target_illuminance.is_finite() || input.target_illuminance < 0.0 {
        return Err(InputError::InvalidTarget(input.target_illuminance));
    }

    Ok(curve.levels(input.target_illuminance))
}
