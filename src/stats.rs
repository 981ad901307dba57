//! Pure state transitions driven by `updates` channel events.

use crate::notifications::{Notification, NotificationKind};
use crate::protocol::{DashboardStats, UpdateEvent};

/// Next dashboard counters after `event`
pub fn reduce(stats: &DashboardStats, event: &UpdateEvent) -> DashboardStats {
    let mut next = stats.clone();
    match event {
        UpdateEvent::CameraConnected { .. } => {
            next.active_cameras = next.active_cameras.saturating_add(1);
        }
        UpdateEvent::CameraDisconnected => {
            next.active_cameras = next.active_cameras.saturating_sub(1);
        }
        UpdateEvent::RecordingStopped { .. } => {
            next.total_recordings = next.total_recordings.saturating_add(1);
        }
        UpdateEvent::DetectionAlert { .. } => {
            next.total_detections = next.total_detections.saturating_add(1);
        }
        UpdateEvent::StatsUpdate(snapshot) => {
            next = snapshot.clone();
        }
        UpdateEvent::RecordingStarted | UpdateEvent::Unknown(_) => {}
    }
    next
}

/// Toast to raise for `event`, if any
pub fn notification_for(event: &UpdateEvent) -> Option<Notification> {
    let notification = match event {
        UpdateEvent::CameraConnected { name } => Notification::new(
            NotificationKind::Success,
            "Camera Connected",
            format!("Camera {} connected successfully", name),
        ),
        UpdateEvent::CameraDisconnected => Notification::new(
            NotificationKind::Info,
            "Camera Disconnected",
            "Camera disconnected",
        ),
        UpdateEvent::RecordingStarted => Notification::new(
            NotificationKind::Info,
            "Recording Started",
            "Video recording has started",
        ),
        UpdateEvent::RecordingStopped { duration } => Notification::new(
            NotificationKind::Success,
            "Recording Stopped",
            format!("Recording saved ({}s)", duration),
        ),
        UpdateEvent::DetectionAlert { class_name, .. } => Notification::new(
            NotificationKind::Warning,
            "Detection Alert",
            format!("{} detected!", class_name),
        ),
        UpdateEvent::StatsUpdate(_) | UpdateEvent::Unknown(_) => return None,
    };
    Some(notification)
}
