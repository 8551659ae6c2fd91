use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::{DeviceRegistry, Settings};
use crate::handles::*;
use crate::services::{
    create_calculator, BrightnessCalculator, CommandService, ControlContext, ControlLoop,
    HttpVendorClient, StatusService, VendorApi,
};

pub struct App {
    pub router: Router,
    pub control_loop: Arc<ControlLoop>,
}

pub fn create_app(settings: &Arc<Settings>) -> anyhow::Result<App> {
    let registry = Arc::new(DeviceRegistry::load(&settings.registry.path)?);
    let vendor: Arc<dyn VendorApi> = Arc::new(HttpVendorClient::new(&settings.vendor)?);
    let calculator = create_calculator(&settings.calculator);

    if settings.vendor.token().is_none() {
        tracing::warn!("no vendor credential configured, status and control calls will fail");
    }

    Ok(build_app(settings, registry, vendor, calculator))
}

/// Wire services and routes around the given collaborators.
///
/// Must be called inside a tokio runtime since it starts the control loop.
pub fn build_app(
    settings: &Settings,
    registry: Arc<DeviceRegistry>,
    vendor: Arc<dyn VendorApi>,
    calculator: Arc<dyn BrightnessCalculator>,
) -> App {
    let status_service = Arc::new(StatusService::new(
        vendor.clone(),
        settings.vendor.clone(),
        registry.clone(),
    ));
    let command_service = Arc::new(CommandService::new(
        vendor,
        settings.vendor.clone(),
        registry.clone(),
        settings.control.fallback_brightness,
    ));

    let control_loop = Arc::new(ControlLoop::start(
        ControlContext {
            status: status_service.clone(),
            commands: command_service.clone(),
            calculator: calculator.clone(),
            registry: registry.clone(),
        },
        &settings.control,
    ));

    let status = Router::new()
        .route("/", get(get_status))
        .with_state(StatusState {
            status_service: status_service.clone(),
        });

    let calculate = Router::new()
        .route("/", post(calculate_brightness))
        .with_state(CalculateState {
            calculator: calculator.clone(),
        });

    let control = Router::new()
        .route("/", post(control_lights))
        .with_state(ControlState {
            command_service: command_service.clone(),
            control_loop: control_loop.clone(),
        });

    let setpoint = Router::new()
        .route("/", get(get_setpoint).put(update_setpoint))
        .route("/presets", get(get_presets))
        .route("/presets/:mode", put(apply_preset))
        .with_state(SetpointState {
            control_loop: control_loop.clone(),
            presets: Arc::new(settings.control.presets.clone()),
        });

    let dashboard = Router::new()
        .route("/snapshot", get(get_snapshot))
        .route("/sensors/history", get(get_sensor_history))
        .route("/lights/groups", get(get_light_groups))
        .route("/notifications", get(get_notifications))
        .with_state(DashboardState {
            control_loop: control_loop.clone(),
            registry: registry.clone(),
        });

    let events = Router::new()
        .route("/", get(sse_handler))
        .with_state(SseState {
            control_loop: control_loop.clone(),
        });

    let router = Router::new()
        .nest("/status", status)
        .nest("/calculate", calculate)
        .nest("/control", control)
        .nest("/setpoint", setpoint)
        .nest("/events", events)
        .merge(dashboard)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    App {
        router,
        control_loop,
    }
}
