use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::net::Connector;
use crate::notifications::NotificationHub;
use crate::protocol::{DashboardStats, ErrorHandler, MessageHandler, UpdateEvent};
use crate::registry::{ConnectionRegistry, TransportHandle};
use crate::stats::{notification_for, reduce};
use crate::types::Channel;

/// One user's `updates` feed folded into dashboard counters
pub struct LiveDashboard<C: Connector> {
    registry: Arc<ConnectionRegistry<C>>,
    user_id: String,
    handle: TransportHandle,
    stats: watch::Receiver<DashboardStats>,
}

impl<C: Connector> LiveDashboard<C> {
    pub async fn start(
        registry: Arc<ConnectionRegistry<C>>,
        hub: NotificationHub,
        user_id: impl Into<String>,
    ) -> Self {
        let user_id = user_id.into();
        let (stats_tx, stats_rx) = watch::channel(DashboardStats::default());

        let on_message: MessageHandler = Arc::new(move |message| {
            let event = UpdateEvent::from_message(&message);
            if let UpdateEvent::Unknown(kind) = &event {
                debug!("Unknown message type: {:?}", kind);
                return;
            }

            stats_tx.send_modify(|stats| *stats = reduce(stats, &event));
            if let Some(notification) = notification_for(&event) {
                hub.notify(notification);
            }
        });

        let error_user = user_id.clone();
        let on_error: ErrorHandler = Arc::new(move |e: &ClientError| {
            warn!("⚠️ Live updates for user {} interrupted: {}", error_user, e);
        });

        let handle = registry
            .connect(Channel::Updates, user_id.clone(), on_message, Some(on_error))
            .await;

        Self {
            registry,
            user_id,
            handle,
            stats: stats_rx,
        }
    }

    pub fn stats(&self) -> DashboardStats {
        self.stats.borrow().clone()
    }

    pub fn watch_stats(&self) -> watch::Receiver<DashboardStats> {
        self.stats.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_open()
    }

    pub fn handle(&self) -> &TransportHandle {
        &self.handle
    }

    pub async fn stop(self) {
        self.registry.disconnect(Channel::Updates, &self.user_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ReconnectPolicy;
    use crate::test_support::MemoryConnector;
    use std::time::Duration;

    fn registry(connector: Arc<MemoryConnector>) -> Arc<ConnectionRegistry<MemoryConnector>> {
        Arc::new(ConnectionRegistry::new(
            connector,
            "ws://localhost:8000",
            ReconnectPolicy::new(5, Duration::from_millis(3000)),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_update_stats_and_raise_notifications() {
        let (connector, mut peers) = MemoryConnector::new();
        let registry = registry(connector.clone());
        let hub = NotificationHub::default();
        let mut toasts = hub.subscribe();

        let dashboard = LiveDashboard::start(registry.clone(), hub.clone(), "42").await;
        let peer = peers.recv().await.unwrap();
        assert!(dashboard.handle().opened().await);
        assert!(dashboard.is_connected());
        assert_eq!(connector.urls(), vec!["ws://localhost:8000/ws/updates/42".to_string()]);

        let mut stats = dashboard.watch_stats();
        peer.to_client
            .send(r#"{"type":"camera_connected","data":{"name":"Gate"}}"#.to_string())
            .unwrap();
        stats.changed().await.unwrap();
        assert_eq!(stats.borrow_and_update().active_cameras, 1);

        let toast = toasts.recv().await.unwrap();
        assert_eq!(toast.message, "Camera Gate connected successfully");

        peer.to_client
            .send(r#"{"type":"detection_alert","data":{"class_name":"person"}}"#.to_string())
            .unwrap();
        stats.changed().await.unwrap();
        assert_eq!(dashboard.stats().total_detections, 1);
        assert_eq!(toasts.recv().await.unwrap().message, "person detected!");

        peer.to_client
            .send(r#"{"type":"stats_update","data":{"active_cameras":4,"total_recordings":2,"total_detections":8,"storage_used_gb":0.5}}"#.to_string())
            .unwrap();
        stats.changed().await.unwrap();
        assert_eq!(
            dashboard.stats(),
            DashboardStats {
                active_cameras: 4,
                total_recordings: 2,
                total_detections: 8,
                storage_used_gb: 0.5,
            }
        );
        // Snapshots are silent
        assert!(toasts.try_recv().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_events_are_ignored() {
        let (connector, mut peers) = MemoryConnector::new();
        let registry = registry(connector);
        let hub = NotificationHub::default();
        let mut toasts = hub.subscribe();

        let dashboard = LiveDashboard::start(registry, hub.clone(), "7").await;
        let peer = peers.recv().await.unwrap();
        assert!(dashboard.handle().opened().await);

        peer.to_client.send(r#"{"type":"firmware_update"}"#.to_string()).unwrap();
        peer.to_client.send(r#"{"type":"recording_started"}"#.to_string()).unwrap();

        // Only the known event produces a toast
        assert_eq!(toasts.recv().await.unwrap().title, "Recording Started");
        assert_eq!(dashboard.stats(), DashboardStats::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_disconnects_without_reconnect() {
        let (connector, mut peers) = MemoryConnector::new();
        let registry = registry(connector.clone());

        let dashboard = LiveDashboard::start(registry.clone(), NotificationHub::default(), "42").await;
        let _peer = peers.recv().await.unwrap();
        assert!(dashboard.handle().opened().await);

        dashboard.stop().await;
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert!(registry.is_empty().await);
        assert_eq!(connector.opens(), 1);
    }
}
