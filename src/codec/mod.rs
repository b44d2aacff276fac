//! Binary wire format for cache keys and values
//!
//! Everything written to the persistent index goes through the [`Encoder`] and
//! [`Decoder`] primitives defined here. Both traits are object safe so that
//! serializers registered at runtime (see [`registry`]) can be stored as trait
//! objects and handed any stream.
//!
//! # Primitives
//!
//! | Primitive | Layout |
//! |-----------|--------|
//! | boolean | one byte, `0` or `1` |
//! | long | 8 bytes, big-endian two's complement |
//! | small int | unsigned LEB128, at most 5 bytes, fits a `u32` |
//! | binary | small int length, then raw bytes |
//! | string | binary of the UTF-8 bytes |
//! | nullable string | boolean presence flag, then string when present |

pub mod binary;
pub mod registry;

pub use binary::{BinaryDecoder, BinaryEncoder, SliceDecoder};
pub use registry::{IdentifierRegistry, IdentifierRegistryBuilder};

use thiserror::Error;

/// Result type alias for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Largest buffer reserved up front when the decoder cannot bound a length.
const MAX_PREALLOC: usize = 64 * 1024;

/// Failures while encoding or decoding the wire format
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("invalid boolean byte {0:#04x}")]
    InvalidBoolean(u8),

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("small int does not fit in 32 bits")]
    VarIntOverflow,

    #[error("length {0} exceeds the small int range")]
    LengthOverflow(usize),

    #[error("{0} trailing bytes after decoded value")]
    TrailingBytes(usize),

    #[error("descriptor hash must contain at least one byte")]
    EmptyDescriptorHash,

    #[error("path {0:?} is not valid UTF-8")]
    NonUtf8Path(std::path::PathBuf),

    #[error("unknown artifact identifier tag {0}")]
    UnknownTag(u32),

    #[error("no serializer registered for artifact identifier kind {0}")]
    UnregisteredIdentifier(&'static str),

    #[error("artifact identifier tag {0} is already registered")]
    DuplicateTag(u32),

    #[error("artifact identifier kind {0} is already registered")]
    DuplicateKind(&'static str),

    #[error("stream error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Whether the error came from reading malformed input
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedEof
                | Self::InvalidBoolean(_)
                | Self::InvalidUtf8
                | Self::VarIntOverflow
                | Self::TrailingBytes(_)
                | Self::EmptyDescriptorHash
                | Self::UnknownTag(_)
        )
    }
}

/// Write side of the wire format
pub trait Encoder {
    /// Append raw bytes to the stream.
    fn write_bytes(&mut self, bytes: &[u8]) -> CodecResult<()>;

    fn write_boolean(&mut self, value: bool) -> CodecResult<()> {
        self.write_bytes(&[u8::from(value)])
    }

    fn write_long(&mut self, value: i64) -> CodecResult<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Write a non-negative count as unsigned LEB128.
    fn write_small_int(&mut self, value: u32) -> CodecResult<()> {
        let mut buf = [0u8; 5];
        let mut len = 0;
        let mut rest = value;
        loop {
            let byte = (rest & 0x7f) as u8;
            rest >>= 7;
            if rest == 0 {
                buf[len] = byte;
                len += 1;
                break;
            }
            buf[len] = byte | 0x80;
            len += 1;
        }
        self.write_bytes(&buf[..len])
    }

    /// Write a length-prefixed byte string.
    fn write_binary(&mut self, bytes: &[u8]) -> CodecResult<()> {
        let len = u32::try_from(bytes.len()).map_err(|_| CodecError::LengthOverflow(bytes.len()))?;
        self.write_small_int(len)?;
        self.write_bytes(bytes)
    }

    fn write_string(&mut self, value: &str) -> CodecResult<()> {
        self.write_binary(value.as_bytes())
    }

    fn write_nullable_string(&mut self, value: Option<&str>) -> CodecResult<()> {
        match value {
            Some(value) => {
                self.write_boolean(true)?;
                self.write_string(value)
            }
            None => self.write_boolean(false),
        }
    }
}

/// Read side of the wire format
pub trait Decoder {
    /// Fill `buf` completely or fail with [`CodecError::UnexpectedEof`].
    fn read_bytes(&mut self, buf: &mut [u8]) -> CodecResult<()>;

    /// Bytes left in the input, when the decoder knows.
    fn remaining(&self) -> Option<usize> {
        None
    }

    fn read_boolean(&mut self) -> CodecResult<bool> {
        let mut byte = [0u8; 1];
        self.read_bytes(&mut byte)?;
        match byte[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidBoolean(other)),
        }
    }

    fn read_long(&mut self) -> CodecResult<i64> {
        let mut buf = [0u8; 8];
        self.read_bytes(&mut buf)?;
        Ok(i64::from_be_bytes(buf))
    }

    fn read_small_int(&mut self) -> CodecResult<u32> {
        let mut value: u32 = 0;
        for shift in (0..35).step_by(7) {
            let mut byte = [0u8; 1];
            self.read_bytes(&mut byte)?;
            let bits = u32::from(byte[0] & 0x7f);
            // Fifth byte may only carry the top four bits.
            if shift == 28 && bits > 0x0f {
                return Err(CodecError::VarIntOverflow);
            }
            value |= bits << shift;
            if byte[0] & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(CodecError::VarIntOverflow)
    }

    fn read_binary(&mut self) -> CodecResult<Vec<u8>> {
        let len = self.read_small_int()? as usize;
        if let Some(remaining) = self.remaining() {
            if len > remaining {
                return Err(CodecError::UnexpectedEof);
            }
        }

        let mut bytes = Vec::with_capacity(len.min(MAX_PREALLOC));
        let mut chunk = [0u8; 4096];
        let mut left = len;
        while left > 0 {
            let n = left.min(chunk.len());
            self.read_bytes(&mut chunk[..n])?;
            bytes.extend_from_slice(&chunk[..n]);
            left -= n;
        }
        Ok(bytes)
    }

    fn read_string(&mut self) -> CodecResult<String> {
        let bytes = self.read_binary()?;
        String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
    }

    fn read_nullable_string(&mut self) -> CodecResult<Option<String>> {
        if self.read_boolean()? {
            self.read_string().map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Reads and writes one value type over the wire format
pub trait Serializer<T>: Send + Sync {
    fn write(&self, encoder: &mut dyn Encoder, value: &T) -> CodecResult<()>;

    fn read(&self, decoder: &mut dyn Decoder) -> CodecResult<T>;
}

/// Encode a single value into a fresh buffer.
pub fn to_bytes<T, S>(serializer: &S, value: &T) -> CodecResult<Vec<u8>>
where
    S: Serializer<T> + ?Sized,
{
    let mut encoder = BinaryEncoder::new(Vec::new());
    serializer.write(&mut encoder, value)?;
    Ok(encoder.into_inner())
}

/// Decode a single value that must span the whole of `bytes`.
pub fn from_bytes<T, S>(serializer: &S, bytes: &[u8]) -> CodecResult<T>
where
    S: Serializer<T> + ?Sized,
{
    let mut decoder = SliceDecoder::new(bytes);
    let value = serializer.read(&mut decoder)?;
    match decoder.remaining_len() {
        0 => Ok(value),
        n => Err(CodecError::TrailingBytes(n)),
    }
}
