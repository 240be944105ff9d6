//! The outer packet frame: `<VarInt length><VarInt packetId><payload>`.

use std::io::{Cursor, Write};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::codec::VarInt;
use crate::error::DecodeError;
use crate::serial::{ReadFrom, WriteTo};

/// Upper bound on a single frame, matching the protocol's 21-bit length cap.
const MAX_FRAME_LEN: i32 = 0x1F_FFFF;

/// A decoded packet frame: id plus raw payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// State-scoped packet id.
    pub id: i32,
    /// Raw payload, to be decoded by the session layer.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Creates a frame from a packet id and payload bytes.
    #[must_use]
    pub fn new(id: i32, payload: Vec<u8>) -> Self {
        Self { id, payload }
    }

    /// Reads one frame from an async stream.
    pub async fn read_async(read: &mut (impl AsyncRead + Unpin)) -> Result<Self, DecodeError> {
        let len = VarInt::read_async(read).await?;
        if !(0..=MAX_FRAME_LEN).contains(&len) {
            return Err(DecodeError::LengthMismatch {
                declared: len as usize,
                actual: 0,
            });
        }
        let mut body = vec![0; len as usize];
        read.read_exact(&mut body)
            .await
            .map_err(|_| DecodeError::Truncated("frame body"))?;
        Self::split_body(body)
    }

    /// Decodes a frame from a length-stripped body buffer.
    pub fn split_body(body: Vec<u8>) -> Result<Self, DecodeError> {
        let mut cursor = Cursor::new(body.as_slice());
        let id = VarInt::read(&mut cursor)?.0;
        let offset = cursor.position() as usize;
        Ok(Self {
            id,
            payload: body[offset..].to_vec(),
        })
    }

    /// Encodes this frame, prefixing the total length.
    pub fn write(&self, writer: &mut impl Write) -> Result<(), std::io::Error> {
        let body_len = VarInt::written_size(self.id) + self.payload.len();
        VarInt(body_len as i32).write(writer)?;
        VarInt(self.id).write(writer)?;
        writer.write_all(&self.payload)
    }

    /// Writes this frame to an async stream.
    pub async fn write_async(
        &self,
        write: &mut (impl AsyncWrite + Unpin),
    ) -> Result<(), std::io::Error> {
        let mut buf = Vec::with_capacity(self.payload.len() + 8);
        self.write(&mut buf)?;
        write.write_all(&buf).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_round_trip() {
        let frame = Frame::new(0x23, vec![1, 2, 3, 4]);
        let mut buf = Vec::new();
        frame.write(&mut buf).unwrap();
        // length = 1 (id) + 4 (payload)
        assert_eq!(buf[0], 5);
        let parsed = Frame::split_body(buf[1..].to_vec()).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn empty_payload_frame() {
        let frame = Frame::new(0, Vec::new());
        let mut buf = Vec::new();
        frame.write(&mut buf).unwrap();
        assert_eq!(buf, [1, 0]);
    }
}
