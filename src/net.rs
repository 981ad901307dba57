use async_trait::async_trait;

use crate::error::Result;

pub mod ws;

pub use ws::{WsConnector, WsTransport};

/// One open socket, text frames only.
#[async_trait]
pub trait Transport: Send {
    /// Next text frame; `None` once the peer has closed.
    ///
    /// Must be cancel-safe: the supervisor races it against outbound
    /// messages and shutdown.
    async fn recv(&mut self) -> Option<Result<String>>;

    async fn send(&mut self, text: String) -> Result<()>;

    /// Best-effort close; errors are only logged.
    async fn close(&mut self);
}

/// Opens transports for the registry
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn open(&self, url: &str) -> Result<Box<dyn Transport>>;
}
