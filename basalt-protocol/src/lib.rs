//! Wire-format primitives for the protocol-5 framing layer: varints,
//! big-endian scalar codecs, the outer packet frame, and connection states.
//!
//! Packet payloads themselves are owned by the session layer; the simulation
//! core only depends on the contracts in this crate.

pub mod codec;
pub mod error;
pub mod frame;
pub mod serial;
pub mod state;

pub use codec::{VarInt, VarLong};
pub use error::DecodeError;
pub use frame::Frame;
pub use serial::{ReadFrom, WriteTo};
pub use state::ConnectionState;
