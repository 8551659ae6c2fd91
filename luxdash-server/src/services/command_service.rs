use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use luxdash_api::{
    clamp_brightness, ControlRequest, ControlResponse, DeviceCommandResult, DeviceId, Group,
    GroupLevels,
};

use crate::configs::{DeviceRegistry, Vendor};
use crate::errors::GatewayError;
use crate::services::{CommandBatch, VendorApi};

/// Sanitized brightness to push to every configured lamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrightnessPlan {
    pub groups: GroupLevels<u8>,
    /// Per-device overrides, taking precedence over the group level
    pub devices: BTreeMap<DeviceId, u8>,
}

impl BrightnessPlan {
    pub fn from_levels(levels: GroupLevels<f64>) -> Self {
        Self {
            groups: levels.map(clamp_brightness),
            devices: BTreeMap::new(),
        }
    }

    pub fn from_request(request: &ControlRequest) -> Self {
        Self {
            groups: request.group_levels().map(clamp_brightness),
            devices: request
                .devices
                .iter()
                .map(|(id, level)| (id.clone(), clamp_brightness(level.value())))
                .collect(),
        }
    }
}

struct LampTarget {
    id: DeviceId,
    group: Option<Group>,
    level: u8,
    fallback: bool,
}

/// Sends brightness commands to the vendor cloud, one request per lamp.
pub struct CommandService {
    vendor: Arc<dyn VendorApi>,
    settings: Vendor,
    registry: Arc<DeviceRegistry>,
    fallback_brightness: u8,
}

impl CommandService {
    pub fn new(
        vendor: Arc<dyn VendorApi>,
        settings: Vendor,
        registry: Arc<DeviceRegistry>,
        fallback_brightness: u8,
    ) -> Self {
        Self {
            vendor,
            settings,
            registry,
            fallback_brightness: fallback_brightness.min(luxdash_api::MAX_BRIGHTNESS),
        }
    }

    /// Issue one command per configured lamp concurrently.
    ///
    /// Per-lamp failures are reported in the response with `ok` cleared;
    /// only missing configuration fails the call.
    pub async fn apply_brightness(&self, plan: &BrightnessPlan) -> Result<ControlResponse, GatewayError> {
        if self.settings.token().is_none() {
            return Err(GatewayError::MissingCredential);
        }

        let light_ids = self.settings.light_ids();
        if light_ids.is_empty() {
            return Err(GatewayError::MissingLightIds);
        }

        let targets: Vec<LampTarget> = light_ids
            .into_iter()
            .map(|id| self.resolve(id, plan))
            .collect();

        tracing::info!(
            "setting brightness L={} M={} W={} on {} lights",
            plan.groups.wall_left,
            plan.groups.wall_middle,
            plan.groups.window,
            targets.len()
        );

        let outcomes = join_all(targets.iter().map(|target| self.send_level(&target.id, target.level))).await;

        let devices: Vec<DeviceCommandResult> = targets
            .into_iter()
            .zip(outcomes)
            .map(|(target, ok)| DeviceCommandResult {
                id: target.id,
                group: target.group,
                level: target.level,
                ok,
                fallback: target.fallback,
            })
            .collect();

        Ok(ControlResponse {
            ok: devices.iter().all(|device| device.ok),
            applied_levels: plan.groups,
            devices,
        })
    }

    fn resolve(&self, id: DeviceId, plan: &BrightnessPlan) -> LampTarget {
        let group = self.registry.light(&id).map(|entry| entry.group);

        if let Some(level) = plan.devices.get(&id) {
            return LampTarget {
                level: *level,
                group,
                fallback: false,
                id,
            };
        }

        match group {
            Some(group) => LampTarget {
                level: *plan.groups.get(group),
                group: Some(group),
                fallback: false,
                id,
            },
            None => {
                tracing::warn!(
                    "light {} is not in the device registry, using fallback brightness {}",
                    id,
                    self.fallback_brightness
                );
                LampTarget {
                    level: self.fallback_brightness,
                    group: None,
                    fallback: true,
                    id,
                }
            }
        }
    }

    async fn send_level(&self, id: &str, level: u8) -> bool {
        let batch = CommandBatch::set_level(&self.settings.schema.command, level);

        match self.vendor.send_commands(id, &batch).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("command to {} failed: {}", id, e);
                false
            }
        }
    }
}
