use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::warn;

use crate::error::ClientError;
use crate::types::{ConnectionKey, ConnectionState};

/// Caller-facing handle to one registered connection.
///
/// Stays valid across reconnects: the supervisor swaps the underlying
/// socket but keeps the outbound queue and state channel.
#[derive(Clone)]
pub struct TransportHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    key: ConnectionKey,
    state: watch::Sender<ConnectionState>,
    outbound: mpsc::UnboundedSender<String>,
}

impl TransportHandle {
    pub(super) fn new(key: ConnectionKey, outbound: mpsc::UnboundedSender<String>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Connecting);
        Self {
            inner: Arc::new(HandleInner { key, state, outbound }),
        }
    }

    pub fn key(&self) -> &ConnectionKey {
        &self.inner.key
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Whether both handles refer to the same registered connection
    pub fn same_transport(&self, other: &TransportHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Wait until the connection is open. Returns `false` if it closes
    /// for good first.
    pub async fn opened(&self) -> bool {
        let mut rx = self.watch_state();
        let opened = match rx
            .wait_for(|state| matches!(state, ConnectionState::Open | ConnectionState::Closed))
            .await
        {
            Ok(state) => *state == ConnectionState::Open,
            Err(_) => false,
        };
        opened
    }

    /// Serialize and queue `message` if the transport is open.
    ///
    /// Returns whether the send was attempted; never errors.
    pub fn send_json<T: Serialize + ?Sized>(&self, message: &T) -> bool {
        if !self.is_open() {
            return false;
        }

        match serde_json::to_string(message).map_err(ClientError::Encode) {
            Ok(text) => self.inner.outbound.send(text).is_ok(),
            Err(e) => {
                warn!("⚠️ Dropping send on {}: {}", self.inner.key, e);
                false
            }
        }
    }

    pub(super) fn set_state(&self, state: ConnectionState) {
        self.inner.state.send_replace(state);
    }
}

impl std::fmt::Debug for TransportHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportHandle")
            .field("key", &self.inner.key)
            .field("state", &self.state())
            .finish()
    }
}

/// Registry bookkeeping for one key
pub struct ConnectionRecord {
    /// Distinguishes this record from a later one under the same key
    pub id: u64,
    pub key: ConnectionKey,
    pub handle: TransportHandle,
    pub attempts: u32,
    shutdown: watch::Sender<bool>,
}

impl ConnectionRecord {
    pub(super) fn new(
        id: u64,
        key: ConnectionKey,
        handle: TransportHandle,
        shutdown: watch::Sender<bool>,
    ) -> Self {
        Self {
            id,
            key,
            handle,
            attempts: 0,
            shutdown,
        }
    }

    /// Intentional close: the supervisor sees the flag before it would
    /// schedule a reconnect, and a pending delay is cut short.
    pub(super) fn close(self) {
        self.shutdown.send_replace(true);
        self.handle.set_state(ConnectionState::Closed);
    }
}
