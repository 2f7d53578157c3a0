//! In-memory stand-in for a serial link.
//!
//! Each end sees the other's writes as separate chunks, in order. Nothing frames or
//! merges them, so a test decides how packets are split by how it calls `send`.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::Mutex;

use crate::transport;
use crate::transport::Transport;

/// One end of a loopback link.
pub struct LoopbackTransport {
    outgoing: mpsc::UnboundedSender<Vec<u8>>,
    incoming: Arc<Mutex<mpsc::UnboundedReceiver<Vec<u8>>>>,
}

impl LoopbackTransport {
    /// Returns `(host, device)`. Dropping either end closes the link for the other,
    /// which then reads `Ok(None)`.
    pub fn pair() -> (Self, Self) {
        let (to_device, from_host) = mpsc::unbounded_channel();
        let (to_host, from_device) = mpsc::unbounded_channel();

        let host = Self { outgoing: to_device, incoming: Arc::new(Mutex::new(from_device)) };
        let device = Self { outgoing: to_host, incoming: Arc::new(Mutex::new(from_host)) };

        (host, device)
    }
}

#[async_trait::async_trait]
impl Transport for LoopbackTransport {
    async fn send(&self, payload: &[u8]) -> transport::Result<()> {
        self.outgoing
            .send(payload.to_vec())
            .map_err(|_| transport::Error::ConnectionLost("Loopback peer dropped".into()))
    }

    async fn recv(&self) -> transport::Result<Option<Vec<u8>>> {
        Ok(self.incoming.lock().await.recv().await)
    }
}
