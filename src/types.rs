use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical socket category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Video,   // Live frames for one camera session
    Updates, // Event notifications for one user
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Video => "video",
            Channel::Updates => "updates",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry key: one live connection per (channel, identity)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionKey {
    pub channel: Channel,
    pub identity: String,
}

impl ConnectionKey {
    pub fn new(channel: Channel, identity: impl Into<String>) -> Self {
        Self {
            channel,
            identity: identity.into(),
        }
    }

    /// Endpoint for this key under `base_url` (`ws://host:port`).
    ///
    /// Trailing slashes on the base are ignored, so `ws://host/` and
    /// `ws://host` derive the same URL. The identity is percent-encoded
    /// as a single path segment.
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/ws/{}/{}",
            base_url.trim_end_matches('/'),
            self.channel,
            urlencoding::encode(&self.identity)
        )
    }
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.channel, self.identity)
    }
}

/// Lifecycle state reported by a transport handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,   // First open in progress
    Open,         // Frames flowing
    Reconnecting, // Waiting out the reconnect delay or re-opening
    Closed,       // Disconnected or reconnect budget exhausted
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Open => "Open",
            ConnectionState::Reconnecting => "Reconnecting",
            ConnectionState::Closed => "Closed",
        };
        f.write_str(label)
    }
}
