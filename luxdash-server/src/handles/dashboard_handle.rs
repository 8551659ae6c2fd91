use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use luxdash_api::{LightGroupSummary, Notification, SensorHistory, StatusResponse};

use crate::configs::DeviceRegistry;
use crate::services::{summarize_groups, ControlLoop};

#[derive(Clone)]
pub struct DashboardState {
    pub control_loop: Arc<ControlLoop>,
    pub registry: Arc<DeviceRegistry>,
}

/// Latest polled snapshot, `null` until the first poll completes.
pub async fn get_snapshot(State(state): State<DashboardState>) -> Json<Option<StatusResponse>> {
    Json(state.control_loop.state().snapshot().await)
}

pub async fn get_sensor_history(State(state): State<DashboardState>) -> Json<Vec<SensorHistory>> {
    Json(state.control_loop.state().sensor_history().await)
}

pub async fn get_light_groups(State(state): State<DashboardState>) -> Json<Vec<LightGroupSummary>> {
    let lights = state
        .control_loop
        .state()
        .snapshot()
        .await
        .map(|snapshot| snapshot.lights)
        .unwrap_or_default();

    Json(summarize_groups(&lights, &state.registry))
}

pub async fn get_notifications(State(state): State<DashboardState>) -> Json<Vec<Notification>> {
    Json(state.control_loop.state().notifications().await)
}
