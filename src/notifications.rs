use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::warn;

pub const DEFAULT_HUB_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Success => "✅",
            NotificationKind::Error => "❌",
            NotificationKind::Warning => "⚠️",
            NotificationKind::Info => "📢",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Assigned by `NotificationCenter::push`; zero until then
    #[serde(default)]
    pub id: u64,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            message: message.into(),
            kind,
            is_read: false,
            created_at: Utc::now(),
        }
    }

    /// Relative age for display: "Just now", "5m ago", "3h ago", or the date
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let secs = now.signed_duration_since(self.created_at).num_seconds();
        if secs < 60 {
            "Just now".to_string()
        } else if secs < 3600 {
            format!("{}m ago", secs / 60)
        } else if secs < 86400 {
            format!("{}h ago", secs / 3600)
        } else {
            self.created_at.format("%Y-%m-%d").to_string()
        }
    }
}

/// Pub/sub for toast notifications.
///
/// Cloning the hub shares the same topic. Publishing with nobody
/// subscribed is not an error.
#[derive(Debug, Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<Notification>,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Returns the number of subscribers reached
    pub fn notify(&self, notification: Notification) -> usize {
        self.tx.send(notification).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(DEFAULT_HUB_CAPACITY)
    }
}

/// Live subscription; dropping it (or `unsubscribe`) stops delivery.
pub struct Subscription {
    rx: broadcast::Receiver<Notification>,
}

impl Subscription {
    /// Next notification, or `None` once every hub handle is gone.
    /// A slow subscriber skips what it missed rather than failing.
    pub async fn recv(&mut self) -> Option<Notification> {
        loop {
            match self.rx.recv().await {
                Ok(notification) => return Some(notification),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("⚠️ Notification subscriber lagged, skipped {}", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn try_recv(&mut self) -> Option<Notification> {
        loop {
            match self.rx.try_recv() {
                Ok(notification) => return Some(notification),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!("⚠️ Notification subscriber lagged, skipped {}", skipped);
                }
                Err(_) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}
}

/// Notification-center state: newest first, with an unread counter.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    notifications: Vec<Notification>,
    unread: usize,
    next_id: u64,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace contents with a fetched list (already newest first)
    pub fn load(&mut self, notifications: Vec<Notification>) {
        self.unread = notifications.iter().filter(|n| !n.is_read).count();
        self.next_id = notifications.iter().map(|n| n.id).max().unwrap_or(0);
        self.notifications = notifications;
    }

    /// Insert at the front and assign an id
    pub fn push(&mut self, mut notification: Notification) -> u64 {
        self.next_id += 1;
        notification.id = self.next_id;
        if !notification.is_read {
            self.unread += 1;
        }
        self.notifications.insert(0, notification);
        self.next_id
    }

    /// Returns whether a notification with `id` exists
    pub fn mark_read(&mut self, id: u64) -> bool {
        match self.notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                if !notification.is_read {
                    notification.is_read = true;
                    self.unread = self.unread.saturating_sub(1);
                }
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for notification in &mut self.notifications {
            notification.is_read = true;
        }
        self.unread = 0;
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn unread_count(&self) -> usize {
        self.unread
    }

    /// Bell badge text; `None` when nothing is unread
    pub fn badge(&self) -> Option<String> {
        match self.unread {
            0 => None,
            1..=9 => Some(self.unread.to_string()),
            _ => Some("9+".to_string()),
        }
    }
}
