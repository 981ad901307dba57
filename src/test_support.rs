//! In-memory transport and helpers shared by unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::error::{ClientError, Result};
use crate::net::{Connector, Transport};
use crate::protocol::MessageHandler;

/// Poll a condition under (usually paused) tokio time until it holds.
macro_rules! eventually {
    ($cond:expr) => {{
        let mut reached = false;
        for _ in 0..2000 {
            if $cond {
                reached = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }
        assert!(reached, "condition never held: {}", stringify!($cond));
    }};
}

/// What the next `open` call does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Accept,
    Refuse,
}

/// Server side of an accepted in-memory connection. Dropping it closes the
/// client's transport as an unexpected close.
pub struct MemoryPeer {
    pub to_client: mpsc::UnboundedSender<String>,
    pub from_client: mpsc::UnboundedReceiver<String>,
    pub closed_by_client: Arc<AtomicBool>,
}

pub struct MemoryConnector {
    script: Mutex<VecDeque<Script>>,
    opens: AtomicUsize,
    open_times: Mutex<Vec<Instant>>,
    urls: Mutex<Vec<String>>,
    peers: mpsc::UnboundedSender<MemoryPeer>,
}

impl MemoryConnector {
    /// Accepts every open
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<MemoryPeer>) {
        Self::with_script([])
    }

    /// Follows `script` in order, then accepts
    pub fn with_script(
        script: impl IntoIterator<Item = Script>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<MemoryPeer>) {
        let (peers, peers_rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            opens: AtomicUsize::new(0),
            open_times: Mutex::new(Vec::new()),
            urls: Mutex::new(Vec::new()),
            peers,
        });
        (connector, peers_rx)
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn open_times(&self) -> Vec<Instant> {
        self.open_times.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn open(&self, url: &str) -> Result<Box<dyn Transport>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.open_times.lock().unwrap().push(Instant::now());
        self.urls.lock().unwrap().push(url.to_string());

        let step = self.script.lock().unwrap().pop_front().unwrap_or(Script::Accept);
        if step == Script::Refuse {
            return Err(ClientError::ConnectionClosed(format!("{} refused", url)));
        }

        let (to_client, inbound) = mpsc::unbounded_channel();
        let (outbound, from_client) = mpsc::unbounded_channel();
        let closed_by_client = Arc::new(AtomicBool::new(false));

        let _ = self.peers.send(MemoryPeer {
            to_client,
            from_client,
            closed_by_client: closed_by_client.clone(),
        });

        Ok(Box::new(MemoryTransport {
            inbound,
            outbound,
            closed_by_client,
        }))
    }
}

struct MemoryTransport {
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: mpsc::UnboundedSender<String>,
    closed_by_client: Arc<AtomicBool>,
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn recv(&mut self) -> Option<Result<String>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn send(&mut self, text: String) -> Result<()> {
        self.outbound
            .send(text)
            .map_err(|_| ClientError::ConnectionClosed("peer dropped".to_string()))
    }

    async fn close(&mut self) {
        self.closed_by_client.store(true, Ordering::SeqCst);
        self.inbound.close();
    }
}

pub fn noop_handler() -> MessageHandler {
    Arc::new(|_| {})
}
