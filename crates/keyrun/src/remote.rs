//! # Remote Device Client
//!
//! Issues keyed calls to a remote device over a `Transport` and resolves its replies.
//!
//! ## Protocol
//!
//! - Outbound calls are encoded on the **outbound keyring** (what the device exposes).
//! - The device answers by calling back the **reply key** of the host's inbound keyring,
//!   passing the result as arguments. The device serves one request at a time, so a
//!   request is only written once the previous one is settled, and the n-th reply
//!   resolves the n-th request.
//! - Any other inbound packet is a device-initiated call and goes to the local
//!   `Dispatcher`. Its reply, if any, is discarded: the device does not listen for one.
//!
//! A background pump reassembles inbound bytes into packets. A corrupted packet or a
//! lost link fails every pending call and every later one.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use keyrpc::Dispatcher;
use keyrpc::Keyring;
use keyrpc::PacketLoader;
use keyrpc::PacketStatus;
use keyrpc::Value;

use crate::transport;
use crate::transport::Transport;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Transport(transport::Error),
    /// The call could not be encoded, or the reply key is not in the inbound keyring.
    Rpc(keyrpc::Error),
    /// The device sent bytes that do not form a packet; the link is out of sync.
    Corrupted(keyrpc::Error),
    Timeout,
    ChannelClosed,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "Transport error: {}", e),
            Self::Rpc(e) => write!(f, "RPC error: {}", e),
            Self::Corrupted(e) => write!(f, "Corrupted packet from device: {}", e),
            Self::Timeout => write!(f, "Request timed out"),
            Self::ChannelClosed => write!(f, "Response channel closed"),
        }
    }
}

impl std::error::Error for Error {}

impl From<transport::Error> for Error {
    fn from(e: transport::Error) -> Self {
        Self::Transport(e)
    }
}

impl From<keyrpc::Error> for Error {
    fn from(e: keyrpc::Error) -> Self {
        Self::Rpc(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// State shared between callers and the pump.
struct Shared {
    pending: DashMap<u64, oneshot::Sender<Result<Vec<Value>>>>,
    failure: Mutex<Option<Error>>,
}

impl Shared {
    fn failure(&self) -> Option<Error> {
        self.failure.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Records `error` and fails every pending request with it.
    fn fail_all(&self, error: Error) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(error.clone());
        let uids: Vec<u64> = self.pending.iter().map(|e| *e.key()).collect();
        for uid in uids {
            if let Some((_, tx)) = self.pending.remove(&uid) {
                let _ = tx.send(Err(error.clone()));
            }
        }
    }
}

/// Removes a request from the pending table when its caller stops waiting.
struct PendingGuard<'a> {
    shared: &'a Shared,
    uid: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.shared.pending.remove(&self.uid);
    }
}

/// A client for one remote device.
pub struct Remote {
    outbound: Arc<Keyring>,
    transport: Arc<dyn Transport>,
    shared: Arc<Shared>,
    /// Uid of the next request. Held from the send until the reply resolves or fails, so
    /// the device sees one request at a time and wire order matches uid order.
    next_uid: tokio::sync::Mutex<u64>,
    timeout: Duration,
    pump: JoinHandle<()>,
}

impl Remote {
    /// Connects over `transport` and spawns the pump task.
    ///
    /// `dispatcher` serves device-initiated calls on the inbound keyring; `reply_key` is
    /// the inbound key the device uses to answer requests. It need not have a handler.
    ///
    /// # Errors
    /// Returns `Error::Rpc(UnknownKey)` if `reply_key` is not in the inbound keyring.
    pub fn new(
        transport: Box<dyn Transport>,
        outbound: Arc<Keyring>,
        dispatcher: Arc<Dispatcher>,
        reply_key: usize,
    ) -> Result<Self> {
        dispatcher.keyring().signature_at(reply_key)?;

        let transport: Arc<dyn Transport> = Arc::from(transport);
        let shared = Arc::new(Shared { pending: DashMap::new(), failure: Mutex::new(None) });

        let pump = tokio::spawn(pump(transport.clone(), shared.clone(), dispatcher, reply_key));

        Ok(Self {
            outbound,
            transport,
            shared,
            next_uid: tokio::sync::Mutex::new(0),
            timeout: DEFAULT_TIMEOUT,
            pump,
        })
    }

    /// Sets how long a call waits for its reply.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn outbound(&self) -> &Arc<Keyring> {
        &self.outbound
    }

    /// Calls `key` on the device and waits for its reply arguments.
    ///
    /// The device handles one request at a time: a call is not written until the previous
    /// one has been answered, has timed out or has been dropped by its caller.
    /// Fire-and-forget signatures return an empty list as soon as the packet is sent.
    pub async fn call(&self, key: usize, args: &[Value]) -> Result<Vec<Value>> {
        let payload = self.outbound.call(key, args)?;
        let expects_reply = self.outbound.signature_at(key)?.ret().is_some();

        let mut next_uid = self.next_uid.lock().await;
        if let Some(e) = self.shared.failure() {
            return Err(e);
        }

        if !expects_reply {
            self.transport.send(&payload).await?;
            return Ok(Vec::new());
        }

        let uid = *next_uid;
        let (tx, rx) = oneshot::channel();
        self.shared.pending.insert(uid, tx);
        let _pending = PendingGuard { shared: &self.shared, uid };

        // the pump may have failed between the check and the insert
        if let Some(e) = self.shared.failure() {
            return Err(e);
        }

        // counted before the send: a send cancelled midway may already be on the wire,
        // and its reply must still consume this uid
        *next_uid += 1;
        if let Err(e) = self.transport.send(&payload).await {
            *next_uid -= 1;
            return Err(e.into());
        }

        tracing::trace!(uid, key, "request sent");

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::ChannelClosed),
            Err(_) => {
                tracing::debug!(uid, key, "request timed out");
                Err(Error::Timeout)
            }
        }
    }

    /// Calls the signature named `name` on the device.
    pub async fn call_named(&self, name: &str, args: &[Value]) -> Result<Vec<Value>> {
        let key = self.outbound.key_of(name).ok_or(keyrpc::Error::UnknownKey {
            key: usize::MAX,
            count: self.outbound.len(),
        })?;
        self.call(key, args).await
    }
}

impl Drop for Remote {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

async fn pump(
    link: Arc<dyn Transport>,
    shared: Arc<Shared>,
    dispatcher: Arc<Dispatcher>,
    reply_key: usize,
) {
    let mut loader = PacketLoader::new(dispatcher.keyring().clone());
    let mut active_uid = 0u64;

    let error = loop {
        let chunk = match link.recv().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => {
                break Error::Transport(transport::Error::ConnectionLost("Stream closed".into()));
            }
            Err(e) => {
                tracing::error!(error = %e, "transport error in pump");
                break Error::Transport(e);
            }
        };

        if let Err(e) = handle_chunk(&chunk, &mut loader, &mut active_uid, &shared, &dispatcher, reply_key) {
            tracing::error!(error = %e, "stopping pump");
            break e;
        }
    };

    shared.fail_all(error);
}

fn handle_chunk(
    chunk: &[u8],
    loader: &mut PacketLoader,
    active_uid: &mut u64,
    shared: &Shared,
    dispatcher: &Dispatcher,
    reply_key: usize,
) -> Result<()> {
    for status in loader.extend(chunk) {
        match status {
            PacketStatus::Loading => {}
            PacketStatus::Dropped(e) => return Err(Error::Corrupted(e)),
            PacketStatus::Resolved(call) if call.key == reply_key => {
                let uid = *active_uid;
                *active_uid += 1;
                match shared.pending.remove(&uid) {
                    Some((_, tx)) => {
                        let _ = tx.send(Ok(call.args));
                    }
                    None => tracing::debug!(uid, "reply for an abandoned request"),
                }
            }
            PacketStatus::Resolved(call) => match dispatcher.dispatch_call(&call) {
                Ok(None) => {}
                Ok(Some(reply)) => {
                    tracing::warn!(key = call.key, len = reply.len(), "discarding reply to device-initiated call");
                }
                Err(e) => tracing::warn!(key = call.key, error = %e, "device-initiated call failed"),
            },
        }
    }
    Ok(())
}
