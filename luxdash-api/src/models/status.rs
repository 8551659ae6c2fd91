use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{DeviceId, Group};

/// A normalized device measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading<V> {
    /// Vendor device identifier
    pub id: DeviceId,
    /// Display name, from the registry or positional
    pub name: String,
    /// Measured value
    pub value: V,
    /// Set when the device could not be read and `value` is a placeholder
    #[serde(default)]
    pub fallback: bool,
}

/// Illuminance in lux.
pub type SensorReading = Reading<f64>;

/// Brightness in percent, `0..=100`.
pub type LampState = Reading<u8>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Light sensor readings in configured order
    pub sensors: Vec<SensorReading>,
    /// Lamp states in configured order
    pub lights: Vec<LampState>,
    /// Time the readings were collected
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorHistory {
    /// Vendor device identifier
    pub id: DeviceId,
    /// Display name
    pub name: String,
    /// Chart color
    pub color: String,
    /// Latest reading
    pub value: f64,
    /// Recent readings, oldest first
    pub history: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightTile {
    /// Vendor device identifier
    pub id: DeviceId,
    /// Display label
    pub label: String,
    /// Brightness in percent
    pub brightness: u8,
    /// Set when the lamp has no registry entry
    pub unmapped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightGroupSummary {
    /// Physical group
    pub group: Group,
    /// Column label
    pub label: String,
    /// Rounded average brightness of the members, `0` when empty
    pub average: u8,
    /// Member lamps
    pub lights: Vec<LightTile>,
}
