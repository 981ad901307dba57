//! Connection registry
//!
//! Single source of truth for live socket connections, keyed by
//! (channel, identity). Each registered key is driven by one supervisor task
//! that opens the transport, pumps frames through the dispatcher and applies
//! the reconnect policy when the socket drops.
//!
//! ```text
//!   connect(key) ──► record exists? ──yes──► existing handle
//!                         │ no
//!                         ▼
//!                  insert record, spawn supervisor
//!                         │
//!     ┌──────────► open ──┴──► pump frames ──► dispatch ──► on_message
//!     │                               │
//!     │                     unexpected close / open error
//!     │                               │
//!     └── sleep(delay) ◄── Retry ◄── policy ──► Exhausted: remove record
//! ```
//!
//! `disconnect` removes the record and raises the shutdown flag, which the
//! supervisor observes both while pumping and while sleeping, so an explicit
//! close never schedules a reconnect.

pub mod reconnect;
pub mod record;
mod supervisor;

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::net::{Connector, WsConnector};
use crate::protocol::{ErrorHandler, MessageHandler};
use crate::types::{Channel, ConnectionKey, ConnectionState};

pub use reconnect::{ReconnectDecision, ReconnectPolicy};
pub use record::{ConnectionRecord, TransportHandle};

use supervisor::{ConnectionMap, Supervisor};

pub struct ConnectionRegistry<C: Connector = WsConnector> {
    connector: Arc<C>,
    policy: ReconnectPolicy,
    base_url: String,
    connections: ConnectionMap,
    next_id: AtomicU64,
}

impl ConnectionRegistry<WsConnector> {
    /// WebSocket-backed registry using the configured endpoint and policy
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(WsConnector),
            config.ws_base_url.clone(),
            ReconnectPolicy::from_config(config),
        )
    }
}

impl<C: Connector> ConnectionRegistry<C> {
    pub fn new(connector: Arc<C>, base_url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self {
            connector,
            policy,
            base_url: base_url.into(),
            connections: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register a connection for (channel, identity).
    ///
    /// Idempotent: if the key is already registered (open, connecting or
    /// waiting to reconnect) the existing handle is returned and the new
    /// handlers are ignored. Returns without waiting for the socket.
    pub async fn connect(
        &self,
        channel: Channel,
        identity: impl Into<String>,
        on_message: MessageHandler,
        on_error: Option<ErrorHandler>,
    ) -> TransportHandle {
        let key = ConnectionKey::new(channel, identity);
        let mut connections = self.connections.lock().await;

        if let Some(record) = connections.get(&key) {
            debug!("♻️ WebSocket already registered: {} ({})", key, record.handle.state());
            return record.handle.clone();
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let url = key.url(&self.base_url);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = TransportHandle::new(key.clone(), outbound_tx);

        let supervisor = Supervisor {
            id,
            key: key.clone(),
            url: url.clone(),
            connector: self.connector.clone(),
            policy: self.policy,
            connections: self.connections.clone(),
            handle: handle.clone(),
            outbound: outbound_rx,
            shutdown: shutdown_rx,
            on_message,
            on_error,
        };

        connections.insert(
            key.clone(),
            ConnectionRecord::new(id, key.clone(), handle.clone(), shutdown_tx),
        );
        drop(connections);

        info!("📡 Opening WebSocket {} -> {}", key, url);
        tokio::spawn(supervisor.run());

        handle
    }

    /// Close and forget the connection for (channel, identity). No-op if
    /// absent; any pending reconnect is cancelled.
    pub async fn disconnect(&self, channel: Channel, identity: &str) {
        let key = ConnectionKey::new(channel, identity);
        let record = self.connections.lock().await.remove(&key);

        if let Some(record) = record {
            record.close();
            info!("🔌 WebSocket disconnected: {}", key);
        }
    }

    /// Close every connection; used at teardown.
    pub async fn disconnect_all(&self) {
        let records: Vec<ConnectionRecord> = {
            let mut connections = self.connections.lock().await;
            connections.drain().map(|(_, record)| record).collect()
        };

        let count = records.len();
        for record in records {
            record.close();
        }
        info!("🔌 Disconnected all WebSockets ({} closed)", count);
    }

    /// Serialize `message` and queue it if the connection is open.
    ///
    /// Returns whether the send was attempted; absent or not-open
    /// connections yield `false`.
    pub async fn send<T: Serialize + ?Sized>(
        &self,
        channel: Channel,
        identity: &str,
        message: &T,
    ) -> bool {
        let key = ConnectionKey::new(channel, identity);
        let handle = self
            .connections
            .lock()
            .await
            .get(&key)
            .map(|record| record.handle.clone());

        match handle {
            Some(handle) => handle.send_json(message),
            None => {
                debug!("No WebSocket registered for {}, dropping send", key);
                false
            }
        }
    }

    pub async fn handle(&self, channel: Channel, identity: &str) -> Option<TransportHandle> {
        let key = ConnectionKey::new(channel, identity);
        self.connections
            .lock()
            .await
            .get(&key)
            .map(|record| record.handle.clone())
    }

    pub async fn contains(&self, channel: Channel, identity: &str) -> bool {
        let key = ConnectionKey::new(channel, identity);
        self.connections.lock().await.contains_key(&key)
    }

    /// Current reconnect-attempt counter, if registered
    pub async fn attempts(&self, channel: Channel, identity: &str) -> Option<u32> {
        let key = ConnectionKey::new(channel, identity);
        self.connections
            .lock()
            .await
            .get(&key)
            .map(|record| record.attempts)
    }

    pub async fn state(&self, channel: Channel, identity: &str) -> Option<ConnectionState> {
        self.handle(channel, identity).await.map(|handle| handle.state())
    }

    pub async fn len(&self) -> usize {
        self.connections.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.lock().await.is_empty()
    }
}
