use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{AppliedBrightness, StatusResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Monotonic sequence number
    pub id: u64,
    /// Severity used for the icon
    pub level: NotificationLevel,
    /// Human readable message
    pub message: String,
    /// Creation time
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Events pushed to dashboard subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum LoopEvent {
    Snapshot(StatusResponse),
    Applied(AppliedBrightness),
    Notification(Notification),
}
