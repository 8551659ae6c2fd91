#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use luxdash_api::Group;
use serde_json::Value;
use tower::ServiceExt;

use luxdash_server::app::build_app;
use luxdash_server::configs::{
    Calculator, CalculatorMode, Control, DeviceRegistry, LightEntry, Logger, Registry,
    SensorEntry, Server, Settings, Vendor, VendorSchema,
};
use luxdash_server::services::{ControlLoop, MockCalculator, MockVendor};

pub struct MockApp {
    pub router: Router,
    pub vendor: Arc<MockVendor>,
    pub calculator: Arc<MockCalculator>,
    pub control_loop: Arc<ControlLoop>,
}

impl MockApp {
    pub fn new() -> Self {
        Self::build(default_vendor(), MockCalculator::new(), test_settings())
    }

    pub fn build(vendor: MockVendor, calculator: MockCalculator, settings: Settings) -> Self {
        let vendor = Arc::new(vendor);
        let calculator = Arc::new(calculator);

        let app = build_app(
            &settings,
            Arc::new(test_registry()),
            vendor.clone(),
            calculator.clone(),
        );

        Self {
            router: app.router,
            vendor,
            calculator,
            control_loop: app.control_loop,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if body.is_some() {
            request = request.header("Content-Type", "application/json");
        }

        let response = self
            .router
            .clone()
            .oneshot(
                request
                    .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, value)
    }

    /// Poll `check` until it holds or two seconds pass.
    pub async fn eventually<F>(&self, mut check: F) -> bool
    where
        F: FnMut(&MockApp) -> bool,
    {
        for _ in 0..100 {
            if check(self) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        check(self)
    }
}

pub fn default_vendor() -> MockVendor {
    MockVendor::new()
        .with_sensor("sensor-a", 320.0)
        .with_light("lamp-left", 0)
        .with_light("lamp-middle", 0)
        .with_light("lamp-window", 0)
}

pub fn vendor_settings(sensor_ids: &str, light_ids: &str) -> Vendor {
    Vendor {
        base_url: String::from("http://vendor.test"),
        token: Some(String::from("test-token")),
        sensor_ids: sensor_ids.to_string(),
        light_ids: light_ids.to_string(),
        timeout_ms: 1000,
        schema: VendorSchema::default(),
    }
}

pub fn test_settings() -> Settings {
    Settings {
        server: Server {
            host: String::from("127.0.0.1"),
            port: 0,
        },
        logger: Logger {
            level: String::from("debug"),
        },
        vendor: vendor_settings("sensor-a", "lamp-left,lamp-middle,lamp-window"),
        calculator: Calculator {
            mode: CalculatorMode::Builtin,
            program: String::new(),
            args: vec![],
            timeout_ms: 1000,
        },
        control: Control {
            poll_interval_secs: 60,
            ..Control::default()
        },
        registry: Registry {
            path: String::new(),
        },
    }
}

pub fn test_registry() -> DeviceRegistry {
    let light = |id: &str, label: &str, group| LightEntry {
        id: id.to_string(),
        label: label.to_string(),
        group,
    };

    DeviceRegistry::from_entries(
        vec![
            light("lamp-left", "L1", Group::WallLeft),
            light("lamp-middle", "M1", Group::WallMiddle),
            light("lamp-window", "R1", Group::Window),
        ],
        vec![SensorEntry {
            id: String::from("sensor-a"),
            name: String::from("Front"),
            color: None,
        }],
    )
    .unwrap()
}

pub fn level_sent_to(app: &MockApp, id: &str) -> Option<u8> {
    app.vendor
        .sent_commands()
        .iter()
        .rev()
        .find(|c| c.device_id == id)
        .and_then(|c| c.level)
}
