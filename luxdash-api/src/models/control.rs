use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{DeviceId, Group, GroupLevels, LooseNumber, MAX_BRIGHTNESS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateRequest {
    /// Desired illuminance in lux, `NaN` when missing or not numeric
    #[serde(rename = "targetIlluminance", alias = "targetLux", default)]
    pub target_illuminance: LooseNumber,
}

/// Round a raw level and clamp it into `0..=100`. Non-finite input maps to `0`.
pub fn clamp_brightness(level: f64) -> u8 {
    if !level.is_finite() {
        return 0;
    }

    level.round().clamp(0.0, MAX_BRIGHTNESS as f64) as u8
}

/// Brightness levels produced by the calculator, not yet sanitized.
pub type CalculateResponse = GroupLevels<f64>;

/// Brightness command body.
///
/// Every level is lenient: missing or non-numeric values count as `0`.
/// `levelR` is the legacy combined wall level and fills `levelL`/`levelM`
/// when those are absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlRequest {
    #[serde(rename = "levelL", default, skip_serializing_if = "Option::is_none")]
    pub level_l: Option<LooseNumber>,
    #[serde(rename = "levelM", default, skip_serializing_if = "Option::is_none")]
    pub level_m: Option<LooseNumber>,
    #[serde(rename = "levelW", default, skip_serializing_if = "Option::is_none")]
    pub level_w: Option<LooseNumber>,
    #[serde(rename = "levelR", default, skip_serializing_if = "Option::is_none")]
    pub level_r: Option<LooseNumber>,
    /// Per-device overrides keyed by vendor id
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub devices: BTreeMap<DeviceId, LooseNumber>,
}

impl ControlRequest {
    /// Raw per-group levels after legacy field resolution.
    pub fn group_levels(&self) -> GroupLevels<f64> {
        let wall = self.level_r.unwrap_or(LooseNumber(0.0));

        GroupLevels {
            wall_left: self.level_l.unwrap_or(wall).value(),
            wall_middle: self.level_m.unwrap_or(wall).value(),
            window: self.level_w.unwrap_or(LooseNumber(0.0)).value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCommandResult {
    /// Vendor device identifier
    pub id: DeviceId,
    /// Registry group, absent for unmapped lamps
    pub group: Option<Group>,
    /// Level that was sent
    pub level: u8,
    /// Whether the vendor accepted the command
    pub ok: bool,
    /// Set when the fallback brightness was used
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlResponse {
    /// True when every lamp accepted its command
    pub ok: bool,
    /// Sanitized group levels
    pub applied_levels: GroupLevels<u8>,
    /// Per-lamp outcome in configured order
    pub devices: Vec<DeviceCommandResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_request_accepts_legacy_name() {
        let request: CalculateRequest = serde_json::from_str(r#"{"targetLux": 320}"#).unwrap();

        assert_eq!(request.target_illuminance.value(), 320.0);

        let request: CalculateRequest = serde_json::from_str("{}").unwrap();
        assert!(request.target_illuminance.value().is_nan());
    }

    #[test]
    fn test_clamp_brightness() {
        assert_eq!(clamp_brightness(10.0), 10);
        assert_eq!(clamp_brightness(200.0), 100);
        assert_eq!(clamp_brightness(-5.0), 0);
        assert_eq!(clamp_brightness(49.5), 50);
        assert_eq!(clamp_brightness(f64::NAN), 0);
        assert_eq!(clamp_brightness(f64::INFINITY), 0);
    }

    #[test]
    fn test_control_request_legacy_wall_level() {
        let request: ControlRequest =
            serde_json::from_str(r#"{"levelW": 40, "levelR": "70"}"#).unwrap();

        assert_eq!(request.group_levels(), GroupLevels::new(70.0, 70.0, 40.0));
    }

    #[test]
    fn test_control_request_missing_levels() {
        let request: ControlRequest = serde_json::from_str(r#"{"levelL": "dim"}"#).unwrap();
        let levels = request.group_levels();

        assert!(levels.wall_left.is_nan());
        assert_eq!(levels.wall_middle, 0.0);
        assert_eq!(levels.window, 0.0);
    }
}
