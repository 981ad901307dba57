use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

use thermalstream_client::protocol::{ErrorHandler, MessageHandler};
use thermalstream_client::{
    telemetry, AppConfig, CameraSession, Channel, ClientError, ConnectionRegistry, LiveDashboard,
    NotificationCenter, NotificationHub, VideoControl,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize telemetry
    telemetry::init_telemetry();
    info!("🚀 Starting ThermalStream live client...");

    // Load configuration
    let config = AppConfig::load()?;
    info!("⚙️ Configuration loaded: {:?}", config);

    let registry = Arc::new(ConnectionRegistry::from_config(&config));
    let hub = NotificationHub::new(config.notification_capacity);

    // Notification center follows the hub for the lifetime of the process
    let mut subscription = hub.subscribe();
    let _center_handle = tokio::spawn(async move {
        let mut center = NotificationCenter::default();
        while let Some(notification) = subscription.recv().await {
            info!(
                "🔔 {} {}: {}",
                notification.kind.icon(),
                notification.title,
                notification.message
            );
            center.push(notification);
            if let Some(badge) = center.badge() {
                info!("🔔 Unread notifications: {}", badge);
            }
        }
    });

    let dashboard = LiveDashboard::start(registry.clone(), hub.clone(), config.user_id.clone()).await;
    let mut stats = dashboard.watch_stats();
    let _stats_handle = tokio::spawn(async move {
        while stats.changed().await.is_ok() {
            let snapshot = stats.borrow_and_update().clone();
            info!(
                "📈 Dashboard: {} cameras, {} recordings, {} detections, {:.2} GB",
                snapshot.active_cameras,
                snapshot.total_recordings,
                snapshot.total_detections,
                snapshot.storage_used_gb
            );
        }
    });

    if let Some(session_id) = config.video_session.clone() {
        let control = VideoControl::new(config.detection_enabled, config.detection_confidence);
        let session = Arc::new(Mutex::new(CameraSession::new(control.clone())));
        if let Ok(mut viewer) = session.lock() {
            viewer.set_session(session_id.clone());
        }

        let viewer = session.clone();
        let on_message: MessageHandler = Arc::new(move |message| {
            let Ok(mut viewer) = viewer.lock() else {
                return;
            };
            if viewer.apply(&message) && viewer.frames_received() % 100 == 1 {
                info!("🎥 {} ({} detections)", viewer, viewer.detections().len());
            }
        });
        let on_error: ErrorHandler = Arc::new(|e: &ClientError| {
            warn!("⚠️ Video stream error: {}", e);
        });

        let handle = registry
            .connect(Channel::Video, session_id.clone(), on_message, Some(on_error))
            .await;

        tokio::spawn(async move {
            if handle.opened().await {
                if !handle.send_json(&control) {
                    warn!("⚠️ Could not send detection settings for {}", handle.key());
                }
            } else {
                error!("❌ Video session {} never opened", session_id);
            }
        });
    }

    tokio::signal::ctrl_c().await?;
    info!("🛑 Shutdown requested");

    dashboard.stop().await;
    registry.disconnect_all().await;

    info!("🛑 Client shutdown complete");
    Ok(())
}
