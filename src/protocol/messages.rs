use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One inbound frame as delivered to a message handler.
///
/// Update events carry `type`/`data`/`timestamp`; video frames carry
/// `frame` (base64 JPEG) and optional `detections` at the top level, which
/// land in `rest`. The discriminator is never validated here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl InboundMessage {
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Top-level field outside `type`/`data`/`timestamp`
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.rest.get(name)
    }

    /// Encoded frame payload, if this is a video frame
    pub fn frame(&self) -> Option<&str> {
        self.field("frame").and_then(Value::as_str)
    }

    /// Detections attached to a video frame; malformed entries yield `None`
    pub fn detections(&self) -> Option<Vec<Detection>> {
        let raw = self.field("detections")?;
        serde_json::from_value(raw.clone()).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// Single detector hit attached to a video frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<u32>,
    pub class_name: String,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

/// Control message accepted on the video channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "detection_control")]
pub struct VideoControl {
    pub enabled: bool,
    pub confidence: f32,
}

impl VideoControl {
    pub fn new(enabled: bool, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.5
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self { enabled, confidence }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_update_event() {
        let raw = r#"{"type":"camera_connected","data":{"name":"Gate"},"timestamp":"2026-02-12 09:59:35"}"#;
        let message: InboundMessage = serde_json::from_str(raw).unwrap();

        assert_eq!(message.kind(), Some("camera_connected"));
        assert_eq!(message.data["name"], "Gate");
        assert_eq!(message.timestamp.as_deref(), Some("2026-02-12 09:59:35"));
        assert!(message.rest.is_empty());
    }

    #[test]
    fn test_parse_video_frame_with_detections() {
        let raw = r#"{
            "frame": "/9j/4AAQ",
            "detections": [
                {"class_id": 0, "class_name": "person", "confidence": 0.91,
                 "bbox": {"x1": 10, "y1": 20, "x2": 110, "y2": 220}}
            ]
        }"#;
        let message: InboundMessage = serde_json::from_str(raw).unwrap();

        assert_eq!(message.kind(), None);
        assert_eq!(message.frame(), Some("/9j/4AAQ"));

        let detections = message.detections().unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].class_name, "person");
        assert_eq!(detections[0].bbox.unwrap().x2, 110);
    }

    #[test]
    fn test_non_object_frames_are_rejected() {
        assert!(serde_json::from_str::<InboundMessage>("[1,2,3]").is_err());
        assert!(serde_json::from_str::<InboundMessage>("42").is_err());
        assert!(serde_json::from_str::<InboundMessage>("null").is_err());
    }

    #[test]
    fn test_video_control_wire_format() {
        let control = VideoControl::new(true, 0.35);
        let json = serde_json::to_value(&control).unwrap();

        assert_eq!(json["type"], "detection_control");
        assert_eq!(json["enabled"], true);
        assert!((json["confidence"].as_f64().unwrap() - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_video_control_clamps_confidence() {
        assert_eq!(VideoControl::new(true, 1.7).confidence, 1.0);
        assert_eq!(VideoControl::new(false, -0.2).confidence, 0.0);
        assert_eq!(VideoControl::new(true, f32::NAN).confidence, 0.5);
    }
}
