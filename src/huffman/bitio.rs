use std::io::{self, Read, Write};

use crate::codec::CodecError;
use crate::huffman::Code;

/// Packs bits most-significant-bit first into bytes and forwards every completed byte.
///
/// A session must end with [`finish`](BitWriter::finish), which pads the last partial byte
/// with zero bits.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    inner: W,
    current: u8,
    filled: u8,
    bytes_written: u64,
}

impl<W: Write> BitWriter<W> {
    pub const fn new(inner: W) -> Self {
        Self {
            inner,
            current: 0,
            filled: 0,
            bytes_written: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        if bit {
            self.current |= 0x80 >> self.filled;
        }
        self.filled += 1;
        if self.filled == 8 {
            self.inner.write_all(&[self.current])?;
            self.bytes_written += 1;
            self.current = 0;
            self.filled = 0;
        }
        Ok(())
    }

    /// Appends every bit of `code`, first bit first.
    pub fn write_bits(&mut self, code: &Code) -> io::Result<()> {
        for bit in code.iter() {
            self.write_bit(bit)?;
        }
        Ok(())
    }

    /// Forces out the final partial byte and returns the underlying writer.
    ///
    /// A session that never emitted a byte still writes one padding byte, so a payload is never
    /// empty.
    pub fn finish(mut self) -> io::Result<(W, u64)> {
        if self.filled > 0 || self.bytes_written == 0 {
            self.inner.write_all(&[self.current])?;
            self.bytes_written += 1;
        }
        Ok((self.inner, self.bytes_written))
    }
}

/// Yields the bits of a byte stream, most-significant-bit first.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    inner: R,
    current: u8,
    remaining: u8,
}

impl<R: Read> BitReader<R> {
    pub const fn new(inner: R) -> Self {
        Self {
            inner,
            current: 0,
            remaining: 0,
        }
    }

    /// Returns the next bit, pulling a fresh byte from the source when needed.
    ///
    /// # Errors
    ///
    /// [`CodecError::UnexpectedEndOfStream`] if a byte is needed past the end of the input.
    pub fn read_next_bit(&mut self) -> Result<bool, CodecError> {
        if self.remaining == 0 {
            let mut byte = [0u8; 1];
            self.inner.read_exact(&mut byte).map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => CodecError::UnexpectedEndOfStream,
                _ => CodecError::Io(e),
            })?;
            self.current = byte[0];
            self.remaining = 8;
        }
        self.remaining -= 1;
        Ok((self.current >> self.remaining) & 1 == 1)
    }
}
