use std::env;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use luxdash_api::{DeviceId, Preset};
use serde::{Deserialize, Serialize};

use crate::configs::normalize_path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

/// Where a measurement lives inside a vendor status document:
/// `components.{component}.{capability}.{attribute}.value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityPath {
    pub component: String,
    pub capability: String,
    pub attribute: String,
}

impl CapabilityPath {
    pub fn new(component: &str, capability: &str, attribute: &str) -> Self {
        Self {
            component: component.to_string(),
            capability: capability.to_string(),
            attribute: attribute.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub component: String,
    pub capability: String,
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorSchema {
    pub sensor: CapabilityPath,
    pub light: CapabilityPath,
    pub command: CommandSpec,
}

impl Default for VendorSchema {
    fn default() -> Self {
        Self {
            sensor: CapabilityPath::new("main", "illuminanceMeasurement", "illuminance"),
            light: CapabilityPath::new("main", "switchLevel", "level"),
            command: CommandSpec {
                component: String::from("main"),
                capability: String::from("switchLevel"),
                command: String::from("setLevel"),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub base_url: String,
    pub token: Option<String>,
    /// Comma separated sensor device ids
    #[serde(default)]
    pub sensor_ids: String,
    /// Comma separated lamp device ids
    #[serde(default)]
    pub light_ids: String,
    pub timeout_ms: u64,
    #[serde(default)]
    pub schema: VendorSchema,
}

impl Vendor {
    /// The credential, ignoring blank values.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn sensor_ids(&self) -> Vec<DeviceId> {
        parse_device_ids(&self.sensor_ids)
    }

    pub fn light_ids(&self) -> Vec<DeviceId> {
        parse_device_ids(&self.light_ids)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculatorMode {
    /// Run an external program per request
    Process,
    /// Use the compensation curve in-process
    Builtin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calculator {
    pub mode: CalculatorMode,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub timeout_ms: u64,
}

impl Calculator {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Control {
    pub poll_interval_secs: u64,
    pub initial_target: f64,
    pub fallback_brightness: u8,
    pub history_size: usize,
    pub notification_size: usize,
    #[serde(default)]
    pub presets: Vec<Preset>,
}

impl Control {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

impl Default for Control {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            initial_target: 150.0,
            fallback_brightness: 50,
            history_size: 20,
            notification_size: 50,
            presets: vec![
                preset("normal", "Normal", 150.0),
                preset("lecture", "Lecture", 500.0),
                preset("presentation", "Presentation", 300.0),
                preset("study", "Study", 1000.0),
            ],
        }
    }
}

fn preset(mode: &str, label: &str, lux: f64) -> Preset {
    Preset {
        mode: mode.to_string(),
        label: label.to_string(),
        lux,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registry {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub vendor: Vendor,
    pub calculator: Calculator,
    pub control: Control,
    pub registry: Registry,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let mut settings: Settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("LUXDASH").separator("__"))
            .set_override_option("vendor.base_url", env::var("SMARTTHINGS_BASE_URL").ok())?
            .set_override_option("vendor.token", env::var("SMARTTHINGS_PAT").ok())?
            .set_override_option("vendor.sensor_ids", env::var("SMARTTHINGS_SENSOR_IDS").ok())?
            .set_override_option("vendor.light_ids", env::var("SMARTTHINGS_LIGHT_IDS").ok())?
            .build()?
            .try_deserialize()?;

        settings.registry.path = normalize_path(&settings.registry.path)
            .map_err(|e| ConfigError::Message(e.to_string()))?
            .to_string_lossy()
            .to_string();

        Ok(settings)
    }
}

/// Split a comma separated id list, dropping blanks.
pub fn parse_device_ids(raw: &str) -> Vec<DeviceId> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device_ids() {
        assert_eq!(parse_device_ids(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(parse_device_ids("").is_empty());
        assert!(parse_device_ids(" , ").is_empty());
    }

    #[test]
    fn test_blank_token_is_missing() {
        let mut vendor = Vendor {
            base_url: String::from("http://localhost"),
            token: Some(String::from("  ")),
            sensor_ids: String::new(),
            light_ids: String::new(),
            timeout_ms: 1000,
            schema: VendorSchema::default(),
        };
        assert_eq!(vendor.token(), None);

        vendor.token = Some(String::from("pat"));
        assert_eq!(vendor.token(), Some("pat"));
    }

    #[test]
    fn test_default_file_deserializes() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(
                include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../configs/default.toml")),
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.calculator.mode, CalculatorMode::Process);
        assert_eq!(settings.vendor.schema, VendorSchema::default());
        assert_eq!(settings.control.presets, Control::default().presets);
        assert_eq!(settings.vendor.token(), None);
    }
}
