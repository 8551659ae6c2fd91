use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, OptionFuture};
use luxdash_api::{
    clamp_target, AppliedBrightness, ControlLoopStatus, ControlResponse, DeviceId, LoopEvent,
    Notification, NotificationLevel, SensorHistory, StatusResponse,
};
use time::OffsetDateTime;
use tokio::sync::{broadcast, oneshot, watch, Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::configs::{Control, DeviceRegistry};
use crate::errors::{GatewayError, SequenceError};
use crate::services::{
    BrightnessCalculator, BrightnessPlan, CommandService, NotificationFeed, SensorHistoryBuffer,
    StatusService,
};

const EVENT_CAPACITY: usize = 64;

/// Collaborators driven by the control loop.
pub struct ControlContext {
    pub status: Arc<StatusService>,
    pub commands: Arc<CommandService>,
    pub calculator: Arc<dyn BrightnessCalculator>,
    pub registry: Arc<DeviceRegistry>,
}

struct LoopView {
    snapshot: Option<StatusResponse>,
    history: SensorHistoryBuffer,
    notifications: NotificationFeed,
    unreachable: BTreeSet<DeviceId>,
    busy: bool,
    sequence_error: Option<String>,
    poll_error: Option<String>,
    last_applied: Option<AppliedBrightness>,
    last_poll: Option<OffsetDateTime>,
}

/// Read side of the control loop. Only the loop task writes to it.
pub struct LoopState {
    view: RwLock<LoopView>,
    events: broadcast::Sender<LoopEvent>,
}

impl LoopState {
    fn new(settings: &Control) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            view: RwLock::new(LoopView {
                snapshot: None,
                history: SensorHistoryBuffer::new(settings.history_size),
                notifications: NotificationFeed::new(settings.notification_size),
                unreachable: BTreeSet::new(),
                busy: false,
                sequence_error: None,
                poll_error: None,
                last_applied: None,
                last_poll: None,
            }),
            events,
        }
    }

    pub async fn snapshot(&self) -> Option<StatusResponse> {
        self.view.read().await.snapshot.clone()
    }

    pub async fn sensor_history(&self) -> Vec<SensorHistory> {
        self.view.read().await.history.series()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.view.read().await.notifications.entries()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LoopEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: LoopEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn notify(&self, view: &mut LoopView, level: NotificationLevel, message: String) {
        let notification = view.notifications.push(level, message);
        self.publish(LoopEvent::Notification(notification));
    }
}

/// Handle to the background task that polls device status and applies
/// brightness whenever the setpoint changes.
pub struct ControlLoop {
    setpoint: watch::Sender<f64>,
    poll_now: Arc<Notify>,
    state: Arc<LoopState>,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ControlLoop {
    pub fn start(context: ControlContext, settings: &Control) -> Self {
        let initial_target = clamp_target(settings.initial_target);
        let (setpoint, setpoint_rx) = watch::channel(initial_target);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let poll_now = Arc::new(Notify::new());
        let state = Arc::new(LoopState::new(settings));

        let worker = Arc::new(Worker {
            context,
            state: state.clone(),
        });
        let task = tokio::spawn(worker.run(
            initial_target,
            settings.poll_interval(),
            setpoint_rx,
            poll_now.clone(),
            shutdown_rx,
        ));

        Self {
            setpoint,
            poll_now,
            state,
            shutdown: Mutex::new(Some(shutdown_tx)),
            task: Mutex::new(Some(task)),
        }
    }

    /// Clamp and store a new setpoint. Returns the stored value.
    ///
    /// Setting the current value again is a no-op.
    pub fn set_target(&self, target: f64) -> f64 {
        let target = clamp_target(target);

        self.setpoint.send_if_modified(|current| {
            if *current == target {
                false
            } else {
                *current = target;
                true
            }
        });

        target
    }

    pub fn target(&self) -> f64 {
        *self.setpoint.borrow()
    }

    /// Poll outside the regular schedule.
    pub fn request_poll(&self) {
        self.poll_now.notify_one();
    }

    pub fn state(&self) -> &Arc<LoopState> {
        &self.state
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LoopEvent> {
        self.state.subscribe()
    }

    pub async fn status(&self) -> ControlLoopStatus {
        let view = self.state.view.read().await;

        ControlLoopStatus {
            target_illuminance: self.target(),
            busy: view.busy,
            error: view.sequence_error.clone().or_else(|| view.poll_error.clone()),
            last_applied: view.last_applied.clone(),
            last_poll: view.last_poll,
        }
    }

    /// Stop the loop and wait for the task to exit. In-flight work is dropped.
    pub async fn stop(&self) {
        let shutdown = self.shutdown.lock().ok().and_then(|mut guard| guard.take());
        if let Some(shutdown) = shutdown {
            let _ = shutdown.send(());
        }

        let task = self.task.lock().ok().and_then(|mut guard| guard.take());
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::error!("control loop task failed: {}", e);
            }
        }
    }
}

impl Drop for ControlLoop {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.task.lock() {
            if let Some(task) = guard.take() {
                task.abort();
            }
        }
    }
}

struct Worker {
    context: ControlContext,
    state: Arc<LoopState>,
}

impl Worker {
    async fn run(
        self: Arc<Self>,
        initial_target: f64,
        poll_interval: Duration,
        mut setpoint: watch::Receiver<f64>,
        poll_now: Arc<Notify>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        let mut ticker = interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut polling: Option<BoxFuture<'static, Result<StatusResponse, GatewayError>>> = None;
        let mut sequence: Option<BoxFuture<'static, Result<ControlResponse, SequenceError>>> = None;
        // The initial value is already marked as seen by the receiver.
        let mut sequence_target = initial_target;

        tracing::info!(
            "control loop started at {} lx, polling every {:?}",
            sequence_target,
            poll_interval
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick(), if polling.is_none() => {
                    polling = Some(self.clone().poll().boxed());
                }
                _ = poll_now.notified(), if polling.is_none() => {
                    polling = Some(self.clone().poll().boxed());
                }
                changed = setpoint.changed() => {
                    if changed.is_err() {
                        break;
                    }

                    let target = *setpoint.borrow_and_update();
                    if sequence.is_some() {
                        tracing::info!("{} lx supersedes the sequence for {} lx", target, sequence_target);
                    }

                    sequence_target = target;
                    sequence = Some(self.clone().apply(target).boxed());

                    let mut view = self.state.view.write().await;
                    view.busy = true;
                    self.state.notify(
                        &mut view,
                        NotificationLevel::Info,
                        format!("Target illuminance set to {target} lx"),
                    );
                }
                Some(result) = OptionFuture::from(polling.as_mut()), if polling.is_some() => {
                    polling = None;
                    self.finish_poll(result).await;
                }
                Some(result) = OptionFuture::from(sequence.as_mut()), if sequence.is_some() => {
                    sequence = None;
                    if self.finish_sequence(sequence_target, result).await {
                        // Replace any poll started before the commands went out.
                        polling = Some(self.clone().poll().boxed());
                    }
                }
            }
        }

        tracing::info!("control loop stopped");
    }

    async fn poll(self: Arc<Self>) -> Result<StatusResponse, GatewayError> {
        self.context.status.fetch_status().await
    }

    async fn apply(self: Arc<Self>, target: f64) -> Result<ControlResponse, SequenceError> {
        let levels = self.context.calculator.calculate(target).await?;
        let plan = BrightnessPlan::from_levels(levels);
        let response = self.context.commands.apply_brightness(&plan).await?;

        if !response.ok {
            return Err(SequenceError::Rejected {
                failed: response.devices.iter().filter(|d| !d.ok).count(),
                total: response.devices.len(),
            });
        }

        Ok(response)
    }

    async fn finish_poll(&self, result: Result<StatusResponse, GatewayError>) {
        let mut view = self.state.view.write().await;

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                let message = e.to_string();
                tracing::warn!("status poll failed: {}", message);

                if view.poll_error.as_deref() != Some(message.as_str()) {
                    self.state.notify(
                        &mut view,
                        NotificationLevel::Error,
                        format!("Status poll failed: {message}"),
                    );
                }
                view.poll_error = Some(message);
                return;
            }
        };

        if view.poll_error.take().is_some() {
            self.state.notify(
                &mut view,
                NotificationLevel::Info,
                String::from("Vendor connection restored"),
            );
        }

        let unreachable: Vec<(&DeviceId, &String)> = snapshot
            .sensors
            .iter()
            .filter(|s| s.fallback)
            .map(|s| (&s.id, &s.name))
            .chain(
                snapshot
                    .lights
                    .iter()
                    .filter(|l| l.fallback)
                    .map(|l| (&l.id, &l.name)),
            )
            .collect();
        let ids: BTreeSet<DeviceId> = unreachable.iter().map(|(id, _)| (*id).clone()).collect();

        if ids != view.unreachable {
            if ids.is_empty() {
                self.state.notify(
                    &mut view,
                    NotificationLevel::Success,
                    String::from("All devices are reachable again"),
                );
            } else {
                let names: Vec<&str> = unreachable.iter().map(|(_, name)| name.as_str()).collect();
                self.state.notify(
                    &mut view,
                    NotificationLevel::Warning,
                    format!("Unreachable: {}", names.join(", ")),
                );
            }
            view.unreachable = ids;
        }

        view.history.record(&snapshot.sensors, &self.context.registry);
        view.last_poll = Some(snapshot.timestamp);
        view.snapshot = Some(snapshot.clone());

        self.state.publish(LoopEvent::Snapshot(snapshot));
    }

    /// Record a finished sequence. Returns true when the levels were applied.
    async fn finish_sequence(&self, target: f64, result: Result<ControlResponse, SequenceError>) -> bool {
        let mut view = self.state.view.write().await;
        view.busy = false;

        match result {
            Ok(response) => {
                let levels = response.applied_levels;
                tracing::info!("applied brightness for {} lx: {:?}", target, levels);

                let applied = AppliedBrightness {
                    target_illuminance: target,
                    result: response,
                    at: OffsetDateTime::now_utc(),
                };

                view.sequence_error = None;
                view.last_applied = Some(applied.clone());
                self.state.notify(
                    &mut view,
                    NotificationLevel::Success,
                    format!(
                        "Brightness applied for {target} lx (L {}%, M {}%, W {}%)",
                        levels.wall_left, levels.wall_middle, levels.window
                    ),
                );
                self.state.publish(LoopEvent::Applied(applied));

                true
            }
            Err(e) => {
                tracing::error!("brightness update for {} lx failed: {}", target, e);

                self.state.notify(
                    &mut view,
                    NotificationLevel::Error,
                    format!("Brightness update for {target} lx failed: {e}"),
                );
                view.sequence_error = Some(e.to_string());

                false
            }
        }
    }
}
