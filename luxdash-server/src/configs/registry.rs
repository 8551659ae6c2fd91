use std::collections::HashMap;
use std::fs;
use std::path::Path;

use luxdash_api::{DeviceId, Group};
use serde::{Deserialize, Serialize};

use crate::errors::RegistryError;

const SENSOR_PALETTE: [&str; 5] = ["#ef4444", "#f97316", "#eab308", "#22c55e", "#3b82f6"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightEntry {
    pub id: DeviceId,
    pub label: String,
    pub group: Group,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorEntry {
    pub id: DeviceId,
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    lights: Vec<LightEntry>,
    #[serde(default)]
    sensors: Vec<SensorEntry>,
}

/// Static device id lookup, read-only for the lifetime of the process.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    lights: HashMap<DeviceId, LightEntry>,
    sensors: HashMap<DeviceId, SensorEntry>,
}

impl DeviceRegistry {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| RegistryError::Read {
            path: path.display().to_string(),
            source: e,
        })?;

        let registry = Self::from_toml(&content)?;

        tracing::info!(
            "loaded device registry from {}: {} lights, {} sensors",
            path.display(),
            registry.lights.len(),
            registry.sensors.len()
        );

        Ok(registry)
    }

    pub fn from_toml(content: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = toml::from_str(content)?;

        Self::from_entries(file.lights, file.sensors)
    }

    pub fn from_entries(
        lights: Vec<LightEntry>,
        sensors: Vec<SensorEntry>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::default();

        for light in lights {
            if registry.lights.contains_key(&light.id) {
                return Err(RegistryError::DuplicateId(light.id));
            }
            registry.lights.insert(light.id.clone(), light);
        }

        for sensor in sensors {
            if registry.sensors.contains_key(&sensor.id) {
                return Err(RegistryError::DuplicateId(sensor.id));
            }
            registry.sensors.insert(sensor.id.clone(), sensor);
        }

        Ok(registry)
    }

    pub fn light(&self, id: &str) -> Option<&LightEntry> {
        self.lights.get(id)
    }

    pub fn sensor(&self, id: &str) -> Option<&SensorEntry> {
        self.sensors.get(id)
    }

    /// Registry label, or the positional `L{n}` name.
    pub fn light_name(&self, id: &str, index: usize) -> String {
        self.light(id)
            .map(|entry| entry.label.clone())
            .unwrap_or_else(|| format!("L{}", index + 1))
    }

    /// Registry name, or the positional `S{n}` name.
    pub fn sensor_name(&self, id: &str, index: usize) -> String {
        self.sensor(id)
            .map(|entry| entry.name.clone())
            .unwrap_or_else(|| format!("S{}", index + 1))
    }

    pub fn sensor_color(&self, id: &str, index: usize) -> String {
        self.sensor(id)
            .and_then(|entry| entry.color.clone())
            .unwrap_or_else(|| SENSOR_PALETTE[index % SENSOR_PALETTE.len()].to_string())
    }
}
