//! Little-endian base-128 variable-length 32-bit integers.

use std::io::{Read, Write};

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::DecodeError;
use crate::serial::{ReadFrom, WriteTo};

/// A variable-length integer. Each byte carries 7 payload bits; the high bit
/// flags continuation. At most 5 bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarInt(pub i32);

impl VarInt {
    /// The maximum number of bytes a `VarInt` can occupy.
    pub const MAX_SIZE: usize = 5;

    /// Returns the exact number of bytes `val` encodes to.
    #[must_use]
    pub const fn written_size(val: i32) -> usize {
        match val {
            0 => 1,
            n => (31 - n.leading_zeros() as usize) / 7 + 1,
        }
    }

    /// Reads a `VarInt` from an async reader, used by the frame layer.
    pub async fn read_async(read: &mut (impl AsyncRead + Unpin)) -> Result<i32, DecodeError> {
        let mut val = 0;
        for i in 0..Self::MAX_SIZE {
            let byte = read
                .read_u8()
                .await
                .map_err(|_| DecodeError::Truncated("VarInt"))?;
            val |= (i32::from(byte) & 0x7F) << (i * 7);
            if byte & 0x80 == 0 {
                return Ok(val);
            }
        }
        Err(DecodeError::TooLong("VarInt"))
    }
}

impl ReadFrom for VarInt {
    fn read(read: &mut impl Read) -> Result<Self, DecodeError> {
        let mut val = 0;
        for i in 0..Self::MAX_SIZE {
            let byte = u8::read(read).map_err(|_| DecodeError::Truncated("VarInt"))?;
            val |= (i32::from(byte) & 0x7F) << (i * 7);
            if byte & 0x80 == 0 {
                return Ok(Self(val));
            }
        }
        Err(DecodeError::TooLong("VarInt"))
    }
}

impl WriteTo for VarInt {
    fn write(&self, writer: &mut impl Write) -> Result<(), std::io::Error> {
        let mut val = self.0;
        loop {
            let b: u8 = val as u8 & 0x7F;
            val = ((val as u32) >> 7) as i32;
            if val == 0 {
                b.write(writer)?;
                break;
            }
            (b | 0x80).write(writer)?;
        }
        Ok(())
    }
}

impl From<i32> for VarInt {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl From<VarInt> for i32 {
    fn from(value: VarInt) -> i32 {
        value.0
    }
}

impl From<usize> for VarInt {
    fn from(value: usize) -> Self {
        Self(value as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn round_trip(value: i32) -> usize {
        let mut buf = Vec::new();
        VarInt(value).write(&mut buf).unwrap();
        let parsed = VarInt::read(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(parsed.0, value);
        buf.len()
    }

    #[test]
    fn known_encodings() {
        let cases: [(i32, &[u8]); 7] = [
            (0, &[0x00]),
            (1, &[0x01]),
            (127, &[0x7F]),
            (128, &[0x80, 0x01]),
            (300, &[0xAC, 0x02]),
            (-1, &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]),
            (i32::MAX, &[0xFF, 0xFF, 0xFF, 0xFF, 0x07]),
        ];
        for (value, expected) in cases {
            let mut buf = Vec::new();
            VarInt(value).write(&mut buf).unwrap();
            assert_eq!(buf, expected, "encoding of {value}");
        }
    }

    #[test]
    fn round_trip_matches_size_function() {
        for value in [
            0,
            1,
            -1,
            127,
            128,
            16383,
            16384,
            2_097_151,
            2_097_152,
            i32::MIN,
            i32::MAX,
        ] {
            assert_eq!(round_trip(value), VarInt::written_size(value));
        }
    }

    #[test]
    fn overlong_input_rejected() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
        let err = VarInt::read(&mut Cursor::new(&bytes[..])).unwrap_err();
        assert!(matches!(err, DecodeError::TooLong("VarInt")));
    }

    #[test]
    fn truncated_input_rejected() {
        let bytes = [0x80];
        let err = VarInt::read(&mut Cursor::new(&bytes[..])).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated("VarInt")));
    }
}
