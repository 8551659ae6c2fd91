use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{ControlResponse, LooseNumber, MAX_TARGET_ILLUMINANCE};

/// Clamp a requested setpoint into `[0, 1500]`; `NaN` becomes `0`.
pub fn clamp_target(target: f64) -> f64 {
    if target.is_nan() {
        return 0.0;
    }

    target.clamp(0.0, MAX_TARGET_ILLUMINANCE)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetpointRequest {
    /// Desired illuminance in lux, clamped by the server
    #[serde(rename = "targetIlluminance", alias = "targetLux", default)]
    pub target_illuminance: LooseNumber,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Stable identifier used in the URL
    pub mode: String,
    /// Display label
    pub label: String,
    /// Setpoint applied by the preset
    pub lux: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedBrightness {
    /// Setpoint the levels were computed for
    pub target_illuminance: f64,
    /// Gateway outcome
    pub result: ControlResponse,
    /// Completion time
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlLoopStatus {
    /// Current setpoint in lux
    pub target_illuminance: f64,
    /// True while a calculate/command sequence is in flight
    pub busy: bool,
    /// User-visible error of the last failed step, if any
    pub error: Option<String>,
    /// Last brightness application that went through
    pub last_applied: Option<AppliedBrightness>,
    /// Time of the last successful poll
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_poll: Option<OffsetDateTime>,
}
