use std::sync::Arc;

use futures::future::join_all;
use luxdash_api::{clamp_brightness, DeviceId, LampState, SensorReading, StatusResponse};
use time::OffsetDateTime;

use crate::configs::{CapabilityPath, DeviceRegistry, Vendor};
use crate::errors::GatewayError;
use crate::services::VendorApi;

/// Reads sensor illuminance and lamp brightness from the vendor cloud.
pub struct StatusService {
    vendor: Arc<dyn VendorApi>,
    settings: Vendor,
    registry: Arc<DeviceRegistry>,
}

impl StatusService {
    pub fn new(vendor: Arc<dyn VendorApi>, settings: Vendor, registry: Arc<DeviceRegistry>) -> Self {
        Self {
            vendor,
            settings,
            registry,
        }
    }

    /// One snapshot of every configured device.
    ///
    /// Individual device failures never fail the snapshot: the device is
    /// reported with value `0` and `fallback` set. Output order follows the
    /// configured id lists.
    pub async fn fetch_status(&self) -> Result<StatusResponse, GatewayError> {
        if self.settings.token().is_none() {
            return Err(GatewayError::MissingCredential);
        }

        let sensor_ids = self.settings.sensor_ids();
        let light_ids = self.settings.light_ids();
        if sensor_ids.is_empty() && light_ids.is_empty() {
            return Err(GatewayError::MissingDeviceIds);
        }

        let schema = &self.settings.schema;
        let (sensor_values, light_values) = tokio::join!(
            self.fetch_measurements(&sensor_ids, &schema.sensor),
            self.fetch_measurements(&light_ids, &schema.light),
        );

        // Failed devices keep their registry name; positional names are only
        // used for ids the registry does not know.
        let sensors = sensor_ids
            .into_iter()
            .zip(sensor_values)
            .enumerate()
            .map(|(index, (id, value))| SensorReading {
                name: self.registry.sensor_name(&id, index),
                value: value.map(|lux| lux.max(0.0)).unwrap_or(0.0),
                fallback: value.is_none(),
                id,
            })
            .collect();

        let lights = light_ids
            .into_iter()
            .zip(light_values)
            .enumerate()
            .map(|(index, (id, value))| LampState {
                name: self.registry.light_name(&id, index),
                value: value.map(clamp_brightness).unwrap_or(0),
                fallback: value.is_none(),
                id,
            })
            .collect();

        Ok(StatusResponse {
            sensors,
            lights,
            timestamp: OffsetDateTime::now_utc(),
        })
    }

    /// `None` marks a device whose request failed.
    async fn fetch_measurements(&self, ids: &[DeviceId], path: &CapabilityPath) -> Vec<Option<f64>> {
        join_all(ids.iter().map(|id| self.fetch_measurement(id, path))).await
    }

    async fn fetch_measurement(&self, id: &str, path: &CapabilityPath) -> Option<f64> {
        match self.vendor.device_status(id).await {
            Ok(status) => Some(status.measurement(path).unwrap_or_else(|| {
                tracing::debug!(
                    "{} has no numeric {}.{}, using 0",
                    id,
                    path.capability,
                    path.attribute
                );
                0.0
            })),
            Err(e) => {
                tracing::error!("status request for {} failed: {}", id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::configs::VendorSchema;
    use crate::services::MockVendor;

    fn vendor_settings(token: Option<&str>, sensors: &str, lights: &str) -> Vendor {
        Vendor {
            base_url: String::from("http://vendor.test"),
            token: token.map(String::from),
            sensor_ids: sensors.to_string(),
            light_ids: lights.to_string(),
            timeout_ms: 1000,
            schema: VendorSchema::default(),
        }
    }

    fn service(vendor: MockVendor, settings: Vendor) -> StatusService {
        StatusService::new(Arc::new(vendor), settings, Arc::new(DeviceRegistry::default()))
    }

    #[tokio::test]
    async fn test_failed_device_becomes_placeholder() {
        let vendor = MockVendor::new()
            .with_sensor("A", 320.0)
            .with_failure("B", 503)
            .with_light("L", 40);
        let service = service(vendor, vendor_settings(Some("pat"), "A,B", "L"));

        let status = service.fetch_status().await.unwrap();

        assert_eq!(status.sensors.len(), 2);
        assert_eq!(status.sensors[0].id, "A");
        assert_eq!(status.sensors[0].name, "S1");
        assert_eq!(status.sensors[0].value, 320.0);
        assert!(!status.sensors[0].fallback);
        assert_eq!(status.sensors[1].id, "B");
        assert_eq!(status.sensors[1].name, "S2");
        assert_eq!(status.sensors[1].value, 0.0);
        assert!(status.sensors[1].fallback);
        assert_eq!(status.lights[0].value, 40);
    }

    #[tokio::test]
    async fn test_missing_field_defaults_to_zero() {
        let vendor = MockVendor::new()
            .with_status("A", json!({ "components": { "main": {} } }))
            .with_status(
                "L",
                json!({ "components": { "main": { "switchLevel": { "level": { "value": 140 } } } } }),
            );
        let service = service(vendor, vendor_settings(Some("pat"), "A", "L"));

        let status = service.fetch_status().await.unwrap();

        assert_eq!(status.sensors[0].value, 0.0);
        assert!(!status.sensors[0].fallback);
        assert_eq!(status.lights[0].value, 100);
    }

    #[tokio::test]
    async fn test_configuration_errors() {
        let missing_token = service(MockVendor::new(), vendor_settings(None, "A", ""));
        assert_eq!(
            missing_token.fetch_status().await.unwrap_err(),
            GatewayError::MissingCredential
        );

        let missing_ids = service(MockVendor::new(), vendor_settings(Some("pat"), " , ", ""));
        assert_eq!(
            missing_ids.fetch_status().await.unwrap_err(),
            GatewayError::MissingDeviceIds
        );
    }
}
