use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use luxdash_server::configs::{DeviceRegistry, Vendor, VendorSchema};
use luxdash_server::errors::VendorError;
use luxdash_server::services::{CommandBatch, HttpVendorClient, StatusService, VendorApi};

const TOKEN: &str = "test-token";

#[derive(Clone, Default)]
struct FakeVendor {
    commands: Arc<Mutex<Vec<(String, Value)>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {TOKEN}"))
}

async fn device_status(
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    match id.as_str() {
        "sensor-1" => Ok(Json(json!({
            "components": { "main": {
                "illuminanceMeasurement": { "illuminance": { "value": 412, "unit": "lux" } }
            } }
        }))),
        "lamp-1" => Ok(Json(json!({
            "components": { "main": { "switchLevel": { "level": { "value": 73 } } } }
        }))),
        _ => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

async fn device_commands(
    Path(id): Path<String>,
    State(state): State<FakeVendor>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }

    state.commands.lock().unwrap().push((id, body));

    StatusCode::OK
}

async fn spawn_vendor() -> (String, FakeVendor) {
    let state = FakeVendor::default();
    let router = Router::new()
        .route("/devices/:id/status", get(device_status))
        .route("/devices/:id/commands", post(device_commands))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{address}/"), state)
}

fn settings(base_url: &str, token: &str, sensors: &str, lights: &str) -> Vendor {
    Vendor {
        base_url: base_url.to_string(),
        token: Some(token.to_string()),
        sensor_ids: sensors.to_string(),
        light_ids: lights.to_string(),
        timeout_ms: 2000,
        schema: VendorSchema::default(),
    }
}

#[tokio::test]
async fn test_device_status_is_parsed() {
    let (base_url, _) = spawn_vendor().await;
    let client = HttpVendorClient::new(&settings(&base_url, TOKEN, "", "")).unwrap();

    let status = client.device_status("sensor-1").await.unwrap();

    assert_eq!(status.measurement(&VendorSchema::default().sensor), Some(412.0));
}

#[tokio::test]
async fn test_error_statuses_are_reported() {
    let (base_url, _) = spawn_vendor().await;

    let client = HttpVendorClient::new(&settings(&base_url, "wrong", "", "")).unwrap();
    assert!(matches!(
        client.device_status("sensor-1").await,
        Err(VendorError::Status { status: 401, .. })
    ));

    let client = HttpVendorClient::new(&settings(&base_url, TOKEN, "", "")).unwrap();
    assert!(matches!(
        client.device_status("unknown").await,
        Err(VendorError::Status { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_commands_are_posted() {
    let (base_url, vendor) = spawn_vendor().await;
    let client = HttpVendorClient::new(&settings(&base_url, TOKEN, "", "")).unwrap();

    client
        .send_commands("lamp-1", &CommandBatch::set_level(&VendorSchema::default().command, 64))
        .await
        .unwrap();

    let commands = vendor.commands.lock().unwrap().clone();
    assert_eq!(
        commands,
        vec![(
            String::from("lamp-1"),
            json!({
                "commands": [{
                    "component": "main",
                    "capability": "switchLevel",
                    "command": "setLevel",
                    "arguments": [64]
                }]
            })
        )]
    );
}

#[tokio::test]
async fn test_status_service_over_http() {
    let (base_url, _) = spawn_vendor().await;
    let settings = settings(&base_url, TOKEN, "sensor-1,sensor-2", "lamp-1");
    let client = Arc::new(HttpVendorClient::new(&settings).unwrap());
    let service = StatusService::new(client, settings, Arc::new(DeviceRegistry::default()));

    let status = service.fetch_status().await.unwrap();

    assert_eq!(status.sensors[0].value, 412.0);
    assert!(status.sensors[1].fallback);
    assert_eq!(status.lights[0].value, 73);
}
