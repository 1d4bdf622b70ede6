//! The frequency header that prefixes every compressed file.
//!
//! Layout, little-endian:
//!
//! ```text
//! u16 record_count            0..=256
//! record_count x { u8 symbol, u32 frequency }
//! ```
//!
//! Only the frequency table is stored. Both sides rebuild the tree and the codes from it.

use std::io::{self, Read, Write};

use crate::codec::CodecError;
use crate::huffman::FrequencyTable;

/// Largest record count a valid header can claim.
pub const MAX_RECORDS: u16 = 256;

const RECORD_LEN: u64 = 1 + 4;

/// Size in bytes of a header holding `records` records.
pub const fn header_len(records: usize) -> u64 {
    2 + records as u64 * RECORD_LEN
}

/// Writes the non-zero entries of `frequencies` in ascending byte order. Returns the bytes written.
pub fn write_header<W: Write>(frequencies: &FrequencyTable, writer: &mut W) -> io::Result<u64> {
    let records = frequencies.len();
    writer.write_all(&(records as u16).to_le_bytes())?;
    for (byte, frequency) in frequencies.entries() {
        writer.write_all(&[byte])?;
        writer.write_all(&frequency.to_le_bytes())?;
    }
    Ok(header_len(records))
}

/// A header as it was read from a compressed stream.
#[derive(Debug)]
pub struct Header {
    pub frequencies: FrequencyTable,
    /// Records present in the stream, counting zero-frequency and repeated ones.
    pub records: u16,
}

impl Header {
    /// Bytes the header occupied in the stream.
    pub const fn encoded_len(&self) -> u64 {
        header_len(self.records as usize)
    }
}

/// Reads a header back into a fresh frequency table.
///
/// Later records for the same byte replace earlier ones.
///
/// # Errors
///
/// [`CodecError::InvalidHeader`] if the record count exceeds [`MAX_RECORDS`],
/// [`CodecError::TruncatedHeader`] if the input ends inside the header.
pub fn read_header<R: Read>(reader: &mut R) -> Result<Header, CodecError> {
    let mut count = [0u8; 2];
    read_exact_or_truncated(reader, &mut count)?;
    let count = u16::from_le_bytes(count);
    if count > MAX_RECORDS {
        if_tracing! {
            tracing::warn!(target = "header", record_count = count, "header record count out of range");
        }
        return Err(CodecError::InvalidHeader(count));
    }

    let mut frequencies = FrequencyTable::new();
    let mut record = [0u8; RECORD_LEN as usize];
    for _ in 0..count {
        read_exact_or_truncated(reader, &mut record)?;
        let frequency = u32::from_le_bytes([record[1], record[2], record[3], record[4]]);
        frequencies.set(record[0], frequency);
    }
    Ok(Header {
        frequencies,
        records: count,
    })
}

fn read_exact_or_truncated<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), CodecError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => CodecError::TruncatedHeader,
        _ => CodecError::Io(e),
    })
}
