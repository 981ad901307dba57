use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `ws://host:port`; channel paths are appended per connection
    pub ws_base_url: String,
    pub user_id: String,
    pub video_session: Option<String>,

    pub max_reconnect_attempts: u32,
    pub reconnect_delay_ms: u64,

    pub detection_enabled: bool,
    pub detection_confidence: f32,
    pub notification_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ws_base_url: "ws://localhost:8000".to_string(),
            user_id: "1".to_string(),
            video_session: None,

            max_reconnect_attempts: 5,
            reconnect_delay_ms: 3000,

            detection_enabled: true,
            detection_confidence: 0.5,
            notification_capacity: 64,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Try to load from the file first
        if let Ok(config_str) = fs::read_to_string(path) {
            let config: AppConfig = serde_json::from_str(&config_str)
                .with_context(|| format!("invalid configuration in {}", path.display()))?;
            return Ok(config);
        }

        // Fall back to default configuration
        tracing::warn!("{} not found, using default configuration", path.display());
        Ok(AppConfig::default())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(DEFAULT_CONFIG_PATH)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let config_str = serde_json::to_string_pretty(self)?;
        fs::write(path, config_str)?;
        Ok(())
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}
