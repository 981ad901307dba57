use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::protocol::{Detection, InboundMessage, VideoControl};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerState {
    #[default]
    NoCamera,  // No session selected
    Waiting,   // Session set, no frame yet
    Streaming, // At least one frame shown
}

/// Live-viewer state for one camera session
#[derive(Debug, Clone)]
pub struct CameraSession {
    pub session_id: Option<String>,
    pub connected: bool,
    current_frame: Option<String>,
    detections: Vec<Detection>,
    frames_received: u64,
    last_frame_at: Option<DateTime<Utc>>,
    detection: VideoControl,
}

impl CameraSession {
    pub fn new(detection: VideoControl) -> Self {
        Self {
            session_id: None,
            connected: false,
            current_frame: None,
            detections: Vec::new(),
            frames_received: 0,
            last_frame_at: None,
            detection,
        }
    }

    pub fn set_session(&mut self, session_id: impl Into<String>) {
        self.session_id = Some(session_id.into());
        self.connected = true;
        self.current_frame = None;
        self.detections.clear();
        self.frames_received = 0;
        self.last_frame_at = None;
    }

    /// Take the frame from a video-channel message. Returns `false` for
    /// messages without a frame, which leave the state untouched.
    pub fn apply(&mut self, message: &InboundMessage) -> bool {
        let Some(frame) = message.frame() else {
            return false;
        };

        self.current_frame = Some(frame.to_string());
        self.detections = message.detections().unwrap_or_default();
        self.frames_received += 1;
        self.last_frame_at = Some(Utc::now());
        true
    }

    pub fn current_frame(&self) -> Option<&str> {
        self.current_frame.as_deref()
    }

    /// JPEG bytes of the current frame
    pub fn decode_frame(&self) -> Result<Option<Vec<u8>>> {
        match &self.current_frame {
            Some(encoded) => Ok(Some(STANDARD.decode(encoded)?)),
            None => Ok(None),
        }
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    /// Whether a frame arrived within `timeout_seconds` of `now`
    pub fn is_live(&self, now: DateTime<Utc>, timeout_seconds: i64) -> bool {
        match self.last_frame_at {
            Some(at) => now.signed_duration_since(at).num_seconds() < timeout_seconds,
            None => false,
        }
    }

    pub fn detection_control(&self) -> &VideoControl {
        &self.detection
    }

    /// Update the detection setting; returns the message to send
    pub fn set_detection(&mut self, enabled: bool, confidence: f32) -> VideoControl {
        self.detection = VideoControl::new(enabled, confidence);
        self.detection.clone()
    }

    pub fn disconnect(&mut self) {
        self.session_id = None;
        self.connected = false;
        self.current_frame = None;
        self.detections.clear();
        self.last_frame_at = None;
    }

    pub fn state(&self) -> ViewerState {
        match (&self.session_id, &self.current_frame) {
            (None, _) => ViewerState::NoCamera,
            (Some(_), None) => ViewerState::Waiting,
            (Some(_), Some(_)) => ViewerState::Streaming,
        }
    }

    pub fn get_state_string(&self) -> &'static str {
        match self.state() {
            ViewerState::NoCamera => "No Camera Connected",
            ViewerState::Waiting => "Waiting For Frames",
            ViewerState::Streaming => "Streaming",
        }
    }
}

impl Default for CameraSession {
    fn default() -> Self {
        Self::new(VideoControl::new(true, 0.5))
    }
}

impl std::fmt::Display for CameraSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CameraSession {{ session: {}, frames: {}, state: {} }}",
            self.session_id.as_deref().unwrap_or("-"),
            self.frames_received,
            self.get_state_string()
        )
    }
}
