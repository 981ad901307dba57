use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, error, info};

use super::reconnect::{ReconnectDecision, ReconnectPolicy};
use super::record::{ConnectionRecord, TransportHandle};
use crate::error::ClientError;
use crate::net::{Connector, Transport};
use crate::protocol::{self, ErrorHandler, MessageHandler};
use crate::types::{ConnectionKey, ConnectionState};

pub(super) type ConnectionMap = Arc<Mutex<HashMap<ConnectionKey, ConnectionRecord>>>;

enum PumpExit {
    /// Caller disconnected
    Shutdown,
    /// Peer closed the socket
    Closed,
    Failed(ClientError),
}

/// Drives one registered connection: open, pump frames, reconnect.
pub(super) struct Supervisor<C: Connector> {
    pub id: u64,
    pub key: ConnectionKey,
    pub url: String,
    pub connector: Arc<C>,
    pub policy: ReconnectPolicy,
    pub connections: ConnectionMap,
    pub handle: TransportHandle,
    pub outbound: mpsc::UnboundedReceiver<String>,
    pub shutdown: watch::Receiver<bool>,
    pub on_message: MessageHandler,
    pub on_error: Option<ErrorHandler>,
}

impl<C: Connector> Supervisor<C> {
    pub async fn run(mut self) {
        loop {
            if self.is_shutdown() {
                break;
            }

            let opened = tokio::select! {
                biased;
                _ = self.shutdown.changed() => break,
                result = self.connector.open(&self.url) => result,
            };

            match opened {
                Ok(mut transport) => {
                    self.reset_attempts().await;
                    self.handle.set_state(ConnectionState::Open);
                    info!("🔌 WebSocket connected: {}", self.key);

                    match self.pump(transport.as_mut()).await {
                        PumpExit::Shutdown => {
                            transport.close().await;
                            break;
                        }
                        PumpExit::Closed => info!("📪 WebSocket closed: {}", self.key),
                        PumpExit::Failed(e) => self.report(&e),
                    }
                }
                Err(e) => self.report(&e),
            }

            // Only an explicit disconnect may skip the policy
            if self.is_shutdown() {
                break;
            }
            self.handle.set_state(ConnectionState::Reconnecting);

            let Some(delay) = self.schedule_reconnect().await else {
                break;
            };

            tokio::select! {
                biased;
                _ = self.shutdown.changed() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.handle.set_state(ConnectionState::Closed);
        debug!("🧹 Supervisor for {} stopped", self.key);
    }

    async fn pump(&mut self, transport: &mut dyn Transport) -> PumpExit {
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.changed() => return PumpExit::Shutdown,
                outgoing = self.outbound.recv() => match outgoing {
                    Some(text) => {
                        if let Err(e) = transport.send(text).await {
                            return PumpExit::Failed(e);
                        }
                    }
                    None => return PumpExit::Shutdown,
                },
                frame = transport.recv() => match frame {
                    Some(Ok(text)) => {
                        protocol::dispatch(&self.key, &text, &self.on_message);
                    }
                    Some(Err(e)) => return PumpExit::Failed(e),
                    None => return PumpExit::Closed,
                },
            }
        }
    }

    fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }

    fn report(&self, e: &ClientError) {
        error!("❌ WebSocket error: {}: {}", self.key, e);
        if let Some(on_error) = &self.on_error {
            on_error(e);
        }
    }

    async fn reset_attempts(&self) {
        let mut connections = self.connections.lock().await;
        if let Some(record) = connections.get_mut(&self.key) {
            if record.id == self.id {
                record.attempts = 0;
            }
        }
    }

    /// Consult the policy. `None` means stop: either the budget is spent
    /// (record removed here) or the record is already gone.
    async fn schedule_reconnect(&self) -> Option<std::time::Duration> {
        let mut connections = self.connections.lock().await;

        let attempts = match connections.get(&self.key) {
            Some(record) if record.id == self.id => record.attempts,
            _ => {
                debug!("Record for {} already removed, not reconnecting", self.key);
                return None;
            }
        };

        match self.policy.decide(attempts) {
            ReconnectDecision::Retry { attempt, delay } => {
                if let Some(record) = connections.get_mut(&self.key) {
                    record.attempts = attempt;
                }
                info!(
                    "🔄 Reconnecting {} (attempt {}/{}) in {:?}",
                    self.key, attempt, self.policy.max_attempts, delay
                );
                Some(delay)
            }
            ReconnectDecision::Exhausted => {
                connections.remove(&self.key);
                error!(
                    "🛑 Max reconnect attempts ({}) reached for {}, giving up",
                    self.policy.max_attempts, self.key
                );
                None
            }
        }
    }
}
