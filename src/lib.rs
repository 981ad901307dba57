#[cfg(test)]
#[macro_use]
mod test_support;

pub mod camera_session;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod net;
pub mod notifications;
pub mod protocol;
pub mod registry;
pub mod stats;
pub mod telemetry;
pub mod types;

pub use camera_session::{CameraSession, ViewerState};
pub use config::AppConfig;
pub use dashboard::LiveDashboard;
pub use error::{ClientError, Result};
pub use notifications::{Notification, NotificationCenter, NotificationHub, NotificationKind};
pub use protocol::{ErrorHandler, InboundMessage, MessageHandler, UpdateEvent, VideoControl};
pub use registry::{ConnectionRegistry, ReconnectPolicy, TransportHandle};
pub use types::{Channel, ConnectionKey, ConnectionState};
