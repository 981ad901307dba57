use std::time::Duration;

use crate::config::AppConfig;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_DELAY: Duration = Duration::from_millis(3000);

/// Fixed-delay, bounded-attempt retry for unexpectedly closed connections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

/// Outcome of consulting the policy after an unexpected close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Re-open after `delay`; `attempt` is the new counter value
    Retry { attempt: u32, delay: Duration },
    /// Budget spent, drop the connection
    Exhausted,
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.max_reconnect_attempts, config.reconnect_delay())
    }

    pub fn decide(&self, attempts: u32) -> ReconnectDecision {
        if attempts < self.max_attempts {
            ReconnectDecision::Retry {
                attempt: attempts + 1,
                delay: self.delay,
            }
        } else {
            ReconnectDecision::Exhausted
        }
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_DELAY)
    }
}
