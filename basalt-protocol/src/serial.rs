//! Big-endian primitive (de)serialization traits.

use std::io::{Read, Write};

use crate::codec::VarInt;
use crate::error::DecodeError;

/// Longest string the protocol accepts, in bytes.
const MAX_STRING_BYTES: i32 = 32767 * 4;

/// A value readable from a wire byte stream.
pub trait ReadFrom: Sized {
    /// Reads one value.
    fn read(data: &mut impl Read) -> Result<Self, DecodeError>;
}

/// A value writable to a wire byte stream.
pub trait WriteTo {
    /// Writes this value.
    fn write(&self, writer: &mut impl Write) -> Result<(), std::io::Error>;
}

macro_rules! impl_scalar {
    ($($ty:ty),*) => {
        $(
            impl ReadFrom for $ty {
                fn read(data: &mut impl Read) -> Result<Self, DecodeError> {
                    let mut buf = [0; size_of::<Self>()];
                    data.read_exact(&mut buf)
                        .map_err(|_| DecodeError::Truncated(stringify!($ty)))?;
                    Ok(Self::from_be_bytes(buf))
                }
            }

            impl WriteTo for $ty {
                fn write(&self, writer: &mut impl Write) -> Result<(), std::io::Error> {
                    writer.write_all(&self.to_be_bytes())
                }
            }
        )*
    };
}

impl_scalar!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl ReadFrom for bool {
    fn read(data: &mut impl Read) -> Result<Self, DecodeError> {
        Ok(u8::read(data)? == 1)
    }
}

impl WriteTo for bool {
    fn write(&self, writer: &mut impl Write) -> Result<(), std::io::Error> {
        u8::from(*self).write(writer)
    }
}

impl ReadFrom for String {
    fn read(data: &mut impl Read) -> Result<Self, DecodeError> {
        let len = VarInt::read(data)?.0;
        if !(0..=MAX_STRING_BYTES).contains(&len) {
            return Err(DecodeError::BadStringLength(len));
        }
        let mut buf = vec![0; len as usize];
        data.read_exact(&mut buf)
            .map_err(|_| DecodeError::Truncated("String"))?;
        String::from_utf8(buf).map_err(|_| DecodeError::InvalidUtf8)
    }
}

impl WriteTo for String {
    fn write(&self, writer: &mut impl Write) -> Result<(), std::io::Error> {
        self.as_str().write(writer)
    }
}

impl WriteTo for &str {
    fn write(&self, writer: &mut impl Write) -> Result<(), std::io::Error> {
        VarInt(self.len() as i32).write(writer)?;
        writer.write_all(self.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn scalars_are_big_endian() {
        let mut buf = Vec::new();
        0x0102_0304_i32.write(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(i32::read(&mut Cursor::new(&buf[..])).unwrap(), 0x0102_0304);
    }

    #[test]
    fn string_round_trip() {
        let mut buf = Vec::new();
        "héllo".write(&mut buf).unwrap();
        let parsed = String::read(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(parsed, "héllo");
    }

    #[test]
    fn truncated_scalar_reports_truncation() {
        let err = i64::read(&mut Cursor::new(&[1, 2, 3][..])).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated(_)));
    }

    #[test]
    fn negative_string_length_rejected() {
        let mut buf = Vec::new();
        VarInt(-1).write(&mut buf).unwrap();
        let err = String::read(&mut Cursor::new(&buf[..])).unwrap_err();
        assert!(matches!(err, DecodeError::BadStringLength(-1)));
    }
}
