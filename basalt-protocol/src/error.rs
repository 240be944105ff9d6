//! Decode error taxonomy.

use thiserror::Error;

/// An error raised while decoding wire data.
///
/// Policy is decided by the session layer: during play the packet is dropped
/// and logged, during handshaking/login the session is closed.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A varint ran past its maximum encoded length.
    #[error("{0} too long")]
    TooLong(&'static str),
    /// The input ended before the value was complete.
    #[error("truncated {0}")]
    Truncated(&'static str),
    /// A string length prefix was negative or beyond the protocol cap.
    #[error("string length {0} out of range")]
    BadStringLength(i32),
    /// String bytes were not valid UTF-8.
    #[error("invalid utf-8 in string")]
    InvalidUtf8,
    /// The frame declared a packet id that is not defined for the state.
    #[error("unknown packet id {id:#04x} in state {state}")]
    UnknownPacketId {
        /// The undefined id.
        id: i32,
        /// The connection state it arrived in.
        state: i32,
    },
    /// The payload was shorter or longer than the frame header declared.
    #[error("payload length mismatch: declared {declared}, got {actual}")]
    LengthMismatch {
        /// Length from the frame header.
        declared: usize,
        /// Bytes actually present.
        actual: usize,
    },
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
