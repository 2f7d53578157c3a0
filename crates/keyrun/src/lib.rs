//! # Keyrun
//!
//! Host-side plumbing for talking to a keyed remote device: a byte transport,
//! and a `Remote` that issues calls and matches replies in request order.

pub mod mock_transport;
pub mod remote;
pub mod transport;

pub use remote::Remote;
pub use transport::Transport;
