//! # KeyRPC
//!
//! Positional, schema-driven calls over raw bytes.
//!
//! ## Architecture
//!
//! A `Keyring` is an ordered list of native signatures; the position of a signature is
//! its key and doubles as the packet header. The packet codec turns `(key, args)` into
//! `header ++ payload` using `keypack` scalars, and the `Dispatcher` runs
//! decode, invoke and encode for inbound packets against a table of handlers.
//!
//! Two keyrings may coexist in one process: one for calls this side receives and one
//! for calls it issues. They never merge; each has its own key space and wire policy.

pub mod dispatch;
pub mod error;
pub mod keyring;
pub mod loader;
pub mod packet;
pub mod signature;

pub use keypack::Endianness;
pub use keypack::Representation;
pub use keypack::ScalarType;
pub use keypack::Value;

pub use dispatch::Dispatcher;
pub use dispatch::Handler;
pub use dispatch::HandlerTable;
pub use dispatch::ReplyMode;
pub use error::Error;
pub use error::Result;
pub use keyring::HeaderWidth;
pub use keyring::Keyring;
pub use keyring::KeyringBuilder;
pub use loader::PacketLoader;
pub use loader::PacketStatus;
pub use packet::Call;
pub use packet::decode_call;
pub use packet::encode_call;
pub use signature::Descriptor;
pub use signature::Signature;

pub use packet::decode_call as unpack;
pub use packet::encode_call as pack;
