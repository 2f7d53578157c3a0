//! # Incremental Packet Loader
//!
//! Assembles packets from a byte stream that arrives one byte or one chunk at a time,
//! as from a serial port.
//!
//! A packet resolves as soon as its header and the payload width of its key are in.
//! An unknown key drops the partial packet at once, so the loader never waits for
//! bytes it cannot size.

use std::sync::Arc;

use crate::error::Error;
use crate::keyring::Keyring;
use crate::packet;
use crate::packet::Call;

/// Outcome of feeding one byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacketStatus {
    /// More bytes are needed.
    Loading,
    /// A full packet arrived and decoded.
    Resolved(Call),
    /// The partial packet was discarded.
    Dropped(Error),
}

#[derive(Debug, Clone)]
pub struct PacketLoader {
    keyring: Arc<Keyring>,
    buf: Vec<u8>,
    expected: Option<usize>,
}

impl PacketLoader {
    pub fn new(keyring: Arc<Keyring>) -> Self {
        Self { keyring, buf: Vec::new(), expected: None }
    }

    pub fn keyring(&self) -> &Arc<Keyring> {
        &self.keyring
    }

    /// True while a partial packet is buffered.
    pub fn is_loading(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Discards any partial packet.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.expected = None;
    }

    /// Feeds one byte.
    pub fn put(&mut self, byte: u8) -> PacketStatus {
        self.buf.push(byte);

        if self.expected.is_none() {
            match packet::peek_key(&self.keyring, &self.buf) {
                Ok(None) => return PacketStatus::Loading,
                Ok(Some(key)) => {
                    // peek_key only returns keys the keyring holds.
                    self.expected = self.keyring.packet_len(key).ok();
                }
                Err(e) => {
                    tracing::debug!(error = %e, "dropping packet with unknown key");
                    self.reset();
                    return PacketStatus::Dropped(e);
                }
            }
        }

        match self.expected {
            Some(len) if self.buf.len() >= len => {
                let result = packet::decode_call(&self.keyring, &self.buf);
                self.reset();
                match result {
                    Ok(call) => PacketStatus::Resolved(call),
                    Err(e) => PacketStatus::Dropped(e),
                }
            }
            _ => PacketStatus::Loading,
        }
    }

    /// Feeds a chunk, returning every status other than `Loading`, in order.
    pub fn extend(&mut self, bytes: &[u8]) -> Vec<PacketStatus> {
        bytes
            .iter()
            .map(|b| self.put(*b))
            .filter(|status| *status != PacketStatus::Loading)
            .collect()
    }
}
