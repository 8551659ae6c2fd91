use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use luxdash_api::GroupLevels;
use luxdash_calculator::CompensationCurve;
use serde::Deserialize;
use serde_json::json;
use tokio::process::Command;

use crate::configs::{Calculator, CalculatorMode};
use crate::errors::CalculatorError;

/// Maps a target illuminance to per-group brightness levels.
///
/// Levels are returned as produced; callers sanitize them before use.
#[async_trait]
pub trait BrightnessCalculator: Send + Sync {
    async fn calculate(&self, target_illuminance: f64) -> Result<GroupLevels<f64>, CalculatorError>;
}

pub fn create_calculator(settings: &Calculator) -> Arc<dyn BrightnessCalculator> {
    match settings.mode {
        CalculatorMode::Process => {
            tracing::info!("using calculator program `{}`", settings.program);
            Arc::new(ProcessCalculator::new(settings))
        }
        CalculatorMode::Builtin => {
            tracing::info!("using built-in compensation curve");
            Arc::new(CurveCalculator::default())
        }
    }
}

/// Runs an external program once per request.
///
/// The program receives `{"targetIlluminance": <lux>}` as its only argument
/// and must print a JSON object with `levelL`, `levelM` and `levelW`.
/// A legacy `levelR` fills the two wall groups when they are absent.
#[derive(Debug, Clone)]
pub struct ProcessCalculator {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ProcessCalculator {
    pub fn new(settings: &Calculator) -> Self {
        Self {
            program: settings.program.clone(),
            args: settings.args.clone(),
            timeout: settings.timeout(),
        }
    }
}

#[async_trait]
impl BrightnessCalculator for ProcessCalculator {
    async fn calculate(&self, target_illuminance: f64) -> Result<GroupLevels<f64>, CalculatorError> {
        tracing::debug!("running {} for {} lx", self.program, target_illuminance);

        let payload = json!({ "targetIlluminance": target_illuminance }).to_string();

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&payload)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(CalculatorError::Spawn)?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| CalculatorError::Timeout(self.timeout))?
            .map_err(CalculatorError::Spawn)?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            return Err(CalculatorError::Exit {
                code: output.status.code(),
                stderr,
            });
        }

        if !stderr.is_empty() {
            tracing::warn!("calculator stderr: {}", stderr);
        }

        parse_output(&String::from_utf8_lossy(&output.stdout))
    }
}

#[derive(Debug, Deserialize)]
struct CalculatorOutput {
    #[serde(rename = "levelL")]
    level_l: Option<f64>,
    #[serde(rename = "levelM")]
    level_m: Option<f64>,
    #[serde(rename = "levelW")]
    level_w: Option<f64>,
    #[serde(rename = "levelR")]
    level_r: Option<f64>,
}

fn parse_output(stdout: &str) -> Result<GroupLevels<f64>, CalculatorError> {
    let stdout = stdout.trim();
    if stdout.is_empty() {
        return Err(CalculatorError::EmptyOutput);
    }

    let output: CalculatorOutput =
        serde_json::from_str(stdout).map_err(|e| CalculatorError::Malformed(e.to_string()))?;

    let missing = |name: &str| CalculatorError::Malformed(format!("missing `{name}`"));

    Ok(GroupLevels {
        wall_left: output.level_l.or(output.level_r).ok_or_else(|| missing("levelL"))?,
        wall_middle: output.level_m.or(output.level_r).ok_or_else(|| missing("levelM"))?,
        window: output.level_w.ok_or_else(|| missing("levelW"))?,
    })
}

/// In-process compensation curve.
#[derive(Debug, Clone, Default)]
pub struct CurveCalculator {
    curve: CompensationCurve,
}

#[async_trait]
impl BrightnessCalculator for CurveCalculator {
    async fn calculate(&self, target_illuminance: f64) -> Result<GroupLevels<f64>, CalculatorError> {
        Ok(self.curve.levels(target_illuminance).map(f64::from))
    }
}

#[cfg(any(test, feature = "mock"))]
pub use mock::*;

#[cfg(any(test, feature = "mock"))]
mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use luxdash_api::GroupLevels;

    use super::BrightnessCalculator;
    use crate::errors::CalculatorError;

    /// Returns `target / 10` for every group and records each call.
    #[derive(Debug, Default)]
    pub struct MockCalculator {
        calls: Mutex<Vec<f64>>,
        delays: HashMap<u64, Duration>,
        fixed: Option<GroupLevels<f64>>,
        failing: bool,
    }

    impl MockCalculator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_levels(mut self, levels: GroupLevels<f64>) -> Self {
            self.fixed = Some(levels);
            self
        }

        /// Delay the answer for one specific target.
        pub fn with_delay_for(mut self, target: f64, delay: Duration) -> Self {
            self.delays.insert(target.to_bits(), delay);
            self
        }

        pub fn failing(mut self) -> Self {
            self.failing = true;
            self
        }

        pub fn calls(&self) -> Vec<f64> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl BrightnessCalculator for MockCalculator {
        async fn calculate(&self, target_illuminance: f64) -> Result<GroupLevels<f64>, CalculatorError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(target_illuminance);
            }

            if let Some(delay) = self.delays.get(&target_illuminance.to_bits()) {
                tokio::time::sleep(*delay).await;
            }

            if self.failing {
                return Err(CalculatorError::Exit {
                    code: Some(1),
                    stderr: String::from("mock failure"),
                });
            }

            Ok(self
                .fixed
                .unwrap_or_else(|| GroupLevels::uniform(target_illuminance / 10.0)))
        }
    }
}
