//! # Transport Abstraction
//!
//! A minimal, async interface for moving bytes between a host and a remote device.
//!
//! ## Philosophy
//!
//! - **Byte-Oriented**: The Transport knows nothing about keys, packets or values.
//!   It moves opaque buffers.
//! - **Unframed**: A `recv` may return part of a packet or several packets at once;
//!   reassembly happens above this layer.

use std::fmt;

/// Errors that occur at the link layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The device is unreachable or the link was dropped.
    ConnectionLost(String),
    /// Generic I/O error or internal transport failure.
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionLost(msg) => write!(f, "Connection lost: {}", msg),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// A bidirectional byte link.
///
/// This trait is designed to be object-safe (`Arc<dyn Transport>`).
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Writes `payload` to the link.
    async fn send(&self, payload: &[u8]) -> Result<()>;

    /// Waits for the next chunk of bytes. `Ok(None)` means the link closed cleanly.
    async fn recv(&self) -> Result<Option<Vec<u8>>>;
}
