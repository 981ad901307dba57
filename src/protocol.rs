use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::error::{ClientError, Result};
use crate::types::ConnectionKey;

pub mod events;
pub mod messages;

pub use events::{DashboardStats, UpdateEvent};
pub use messages::{BoundingBox, Detection, InboundMessage, VideoControl};

/// Caller-supplied sink for parsed frames
pub type MessageHandler = Arc<dyn Fn(InboundMessage) + Send + Sync>;

/// Caller-supplied sink for transport errors
pub type ErrorHandler = Arc<dyn Fn(&ClientError) + Send + Sync>;

pub fn parse_frame(raw: &str) -> Result<InboundMessage> {
    serde_json::from_str(raw).map_err(ClientError::Decode)
}

/// Parse one frame and deliver it to `handler`.
///
/// Malformed frames are logged and dropped; the handler never sees them.
/// A panicking handler loses only the frame it was given.
/// Returns whether the frame was delivered.
pub fn dispatch(key: &ConnectionKey, raw: &str, handler: &MessageHandler) -> bool {
    match parse_frame(raw) {
        Ok(message) => {
            debug!("📨 Frame on {}: type={:?}", key, message.kind());
            match panic::catch_unwind(AssertUnwindSafe(|| handler(message))) {
                Ok(()) => true,
                Err(payload) => {
                    error!("❌ Message handler panicked on {}: {}", key, panic_message(&*payload));
                    false
                }
            }
        }
        Err(e) => {
            warn!("⚠️ Dropping malformed frame on {} ({} bytes): {}", key, raw.len(), e);
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&str>() {
        *text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.as_str()
    } else {
        "non-string panic"
    }
}
