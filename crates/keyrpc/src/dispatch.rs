//! # Dispatcher
//!
//! Binds a keyring to native handlers and runs one call cycle per inbound buffer.
//!
//! ## Cycle
//!
//! 1. **Decoding**: the buffer is decoded against the keyring. Any failure ends the
//!    cycle before a handler runs.
//! 2. **Invoking**: the handler bound to the key runs to completion with the decoded
//!    arguments. A descriptor without a handler is `UnregisteredKey`.
//! 3. **Encoding**: if the descriptor declares a return type, the result is encoded
//!    per the `ReplyMode`. Fire-and-forget descriptors produce no reply.
//!
//! A failed cycle reports its reason and leaves the dispatcher usable for the next buffer.
//!
//! ## Concurrency
//!
//! The dispatcher holds no mutable state. Callers that receive buffers from several
//! threads serialize calls into it themselves; handlers that need state bring their own
//! interior mutability.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use keypack::Value;

use crate::error::Error;
use crate::error::Result;
use crate::keyring::Keyring;
use crate::packet;
use crate::packet::Call;

/// A native function reachable through a key.
///
/// Returning `None` means "no value", which is only valid for fire-and-forget descriptors.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, args: &[Value]) -> Option<Value>;
}

impl<F> Handler for F
where
    F: Fn(&[Value]) -> Option<Value> + Send + Sync + 'static,
{
    fn call(&self, args: &[Value]) -> Option<Value> {
        self(args)
    }
}

/// Handlers keyed by descriptor key, collected before the dispatcher is built.
#[derive(Default)]
pub struct HandlerTable {
    handlers: HashMap<usize, Box<dyn Handler>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handler` to `key`, replacing any earlier binding.
    pub fn bind(mut self, key: usize, handler: impl Handler) -> Self {
        self.insert(key, handler);
        self
    }

    pub fn insert(&mut self, key: usize, handler: impl Handler) {
        self.handlers.insert(key, Box::new(handler));
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// How a handler's return value leaves the dispatcher.
#[derive(Debug, Clone, Default)]
pub enum ReplyMode {
    /// The return value alone, at the width of the declared return type.
    #[default]
    Bare,
    /// A packet on a paired reply keyring whose `key` takes the value as its single argument.
    Keyed { keyring: Arc<Keyring>, key: usize },
    /// Never reply; return values are checked and dropped.
    Silent,
}

/// Runs decode, invoke and encode for inbound packets.
pub struct Dispatcher {
    keyring: Arc<Keyring>,
    handlers: HashMap<usize, Box<dyn Handler>>,
    reply: ReplyMode,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bound: Vec<_> = self.handlers.keys().copied().collect();
        bound.sort_unstable();
        f.debug_struct("Dispatcher")
            .field("keyring", &self.keyring)
            .field("bound", &bound)
            .field("reply", &self.reply)
            .finish()
    }
}

impl Dispatcher {
    /// Freezes `handlers` against `keyring`. The keyring may hold more signatures than
    /// there are handlers.
    ///
    /// # Errors
    /// Returns `Error::UnknownKey` if a handler is bound to a key the keyring lacks.
    pub fn new(keyring: Arc<Keyring>, handlers: HandlerTable) -> Result<Self> {
        for key in handlers.handlers.keys() {
            keyring.signature_at(*key)?;
        }
        Ok(Self { keyring, handlers: handlers.handlers, reply: ReplyMode::Bare })
    }

    /// Sets the reply policy.
    ///
    /// # Errors
    /// For `ReplyMode::Keyed`: `Error::UnknownKey` if the reply key is missing from the
    /// reply keyring, `Error::ArityMismatch` if it does not take exactly one argument.
    pub fn with_reply(mut self, reply: ReplyMode) -> Result<Self> {
        if let ReplyMode::Keyed { keyring, key } = &reply {
            let desc = keyring.signature_at(*key)?;
            if desc.params().len() != 1 {
                return Err(Error::ArityMismatch { key: *key, expected: 1, found: desc.params().len() });
            }
        }
        self.reply = reply;
        Ok(self)
    }

    pub fn keyring(&self) -> &Arc<Keyring> {
        &self.keyring
    }

    pub fn reply_mode(&self) -> &ReplyMode {
        &self.reply
    }

    pub fn is_bound(&self, key: usize) -> bool {
        self.handlers.contains_key(&key)
    }

    /// Runs one full cycle on a buffer holding exactly one packet.
    ///
    /// Returns the encoded reply, or `None` for fire-and-forget calls.
    pub fn dispatch(&self, bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        let call = packet::decode_call(&self.keyring, bytes).inspect_err(|e| {
            tracing::debug!(len = bytes.len(), error = %e, "dropping undecodable packet");
        })?;
        self.dispatch_call(&call)
    }

    /// Resolves every back-to-back packet in `bytes`, returning one reply slot per packet.
    ///
    /// Stops at the first failure; handlers of earlier packets have already run.
    pub fn dispatch_all(&self, bytes: &[u8]) -> Result<Vec<Option<Vec<u8>>>> {
        let mut replies = Vec::new();
        let mut offset = 0;
        while offset < bytes.len() {
            let (call, used) = packet::decode_prefix(&self.keyring, &bytes[offset..]).inspect_err(|e| {
                tracing::debug!(offset, error = %e, "stream dispatch stopped");
            })?;
            replies.push(self.dispatch_call(&call)?);
            offset += used;
        }
        Ok(replies)
    }

    /// Runs the invoke and encode half of the cycle on an already decoded call.
    pub fn dispatch_call(&self, call: &Call) -> Result<Option<Vec<u8>>> {
        let key = call.key;
        let desc = self.keyring.signature_at(key)?;
        if call.args.len() != desc.params().len() {
            return Err(Error::ArityMismatch { key, expected: desc.params().len(), found: call.args.len() });
        }

        let handler = self.handlers.get(&key).ok_or_else(|| {
            tracing::warn!(key, name = desc.name(), "no handler bound");
            Error::UnregisteredKey { key }
        })?;

        tracing::trace!(key, name = desc.name(), args = ?call.args, "invoking handler");
        let result = handler.call(&call.args);

        let value = match (desc.ret(), result) {
            (None, None) => return Ok(None),
            (Some(ty), Some(value)) => ty
                .coerce(value, self.keyring.representation())
                .map_err(|_| Error::OutOfRange { key, index: None, ty, value: value.as_i128() })?,
            (expected, found) => {
                return Err(Error::TypeMismatch { key, expected, found: found.map(|v| v.ty()) });
            }
        };

        self.encode_reply(key, value)
    }

    fn encode_reply(&self, key: usize, value: Value) -> Result<Option<Vec<u8>>> {
        match &self.reply {
            ReplyMode::Silent => Ok(None),
            ReplyMode::Bare => {
                let mut enc = self.keyring.encoder();
                enc.value(value).map_err(|_| Error::OutOfRange {
                    key,
                    index: None,
                    ty: value.ty(),
                    value: value.as_i128(),
                })?;
                Ok(Some(enc.into_bytes()))
            }
            ReplyMode::Keyed { keyring, key: reply_key } => {
                let bytes = packet::encode_call(keyring, *reply_key, &[value])?;
                tracing::trace!(key, reply_key, len = bytes.len(), "encoded keyed reply");
                Ok(Some(bytes))
            }
        }
    }
}
