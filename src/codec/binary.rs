//! Stream and slice backed encoder/decoder implementations

use super::{CodecError, CodecResult, Decoder, Encoder};
use std::io::{ErrorKind, Read, Write};

/// Encoder writing to any [`Write`] sink
#[derive(Debug)]
pub struct BinaryEncoder<W: Write> {
    inner: W,
}

impl<W: Write> BinaryEncoder<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Flush and return the underlying sink
    pub fn finish(mut self) -> CodecResult<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Encoder for BinaryEncoder<W> {
    fn write_bytes(&mut self, bytes: &[u8]) -> CodecResult<()> {
        self.inner.write_all(bytes)?;
        Ok(())
    }
}

/// Decoder reading from any [`Read`] source
#[derive(Debug)]
pub struct BinaryDecoder<R: Read> {
    inner: R,
}

impl<R: Read> BinaryDecoder<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> Decoder for BinaryDecoder<R> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> CodecResult<()> {
        self.inner.read_exact(buf).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => CodecError::UnexpectedEof,
            _ => CodecError::Io(e),
        })
    }
}

/// Decoder over an in-memory buffer
///
/// Knows how much input is left, so length prefixes larger than the buffer
/// fail before anything is allocated.
#[derive(Debug, Clone)]
pub struct SliceDecoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SliceDecoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Bytes not yet consumed
    pub fn remaining_len(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_len() == 0
    }

    /// Current read offset
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl Decoder for SliceDecoder<'_> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> CodecResult<()> {
        let end = self
            .pos
            .checked_add(buf.len())
            .filter(|end| *end <= self.bytes.len())
            .ok_or(CodecError::UnexpectedEof)?;
        buf.copy_from_slice(&self.bytes[self.pos..end]);
        self.pos = end;
        Ok(())
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.remaining_len())
    }
}
