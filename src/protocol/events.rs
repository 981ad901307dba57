use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::messages::InboundMessage;

pub const EVENT_CAMERA_CONNECTED: &str = "camera_connected";
pub const EVENT_CAMERA_DISCONNECTED: &str = "camera_disconnected";
pub const EVENT_RECORDING_STARTED: &str = "recording_started";
pub const EVENT_RECORDING_STOPPED: &str = "recording_stopped";
pub const EVENT_DETECTION_ALERT: &str = "detection_alert";
pub const EVENT_STATS_UPDATE: &str = "stats_update";

/// Snapshot of the dashboard counters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub active_cameras: u32,
    #[serde(default)]
    pub total_recordings: u32,
    #[serde(default)]
    pub total_detections: u32,
    #[serde(default)]
    pub storage_used_gb: f64,
}

/// Typed view of an `updates` channel event
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateEvent {
    CameraConnected { name: String },
    CameraDisconnected,
    RecordingStarted,
    RecordingStopped { duration: f64 },
    DetectionAlert { class_name: String, confidence: Option<f32> },
    StatsUpdate(DashboardStats),
    Unknown(String),
}

#[derive(Deserialize, Default)]
struct CameraPayload {
    #[serde(default)]
    name: String,
}

#[derive(Deserialize, Default)]
struct RecordingPayload {
    #[serde(default)]
    duration: f64,
}

#[derive(Deserialize, Default)]
struct DetectionPayload {
    #[serde(default)]
    class_name: String,
    #[serde(default)]
    confidence: Option<f32>,
}

fn payload<T: DeserializeOwned + Default>(data: &Value) -> T {
    serde_json::from_value(data.clone()).unwrap_or_default()
}

impl UpdateEvent {
    /// Decode a message by its `type`. Missing or ill-typed payload fields
    /// fall back to defaults; an absent `type` decodes as `Unknown("")`.
    pub fn from_message(message: &InboundMessage) -> Self {
        let kind = message.kind().unwrap_or_default();
        match kind {
            EVENT_CAMERA_CONNECTED => {
                let payload: CameraPayload = payload(&message.data);
                UpdateEvent::CameraConnected { name: payload.name }
            }
            EVENT_CAMERA_DISCONNECTED => UpdateEvent::CameraDisconnected,
            EVENT_RECORDING_STARTED => UpdateEvent::RecordingStarted,
            EVENT_RECORDING_STOPPED => {
                let payload: RecordingPayload = payload(&message.data);
                UpdateEvent::RecordingStopped { duration: payload.duration }
            }
            EVENT_DETECTION_ALERT => {
                let payload: DetectionPayload = payload(&message.data);
                UpdateEvent::DetectionAlert {
                    class_name: payload.class_name,
                    confidence: payload.confidence,
                }
            }
            EVENT_STATS_UPDATE => UpdateEvent::StatsUpdate(payload(&message.data)),
            other => UpdateEvent::Unknown(other.to_string()),
        }
    }
}
