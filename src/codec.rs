use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::huffman::{
    BitReader, BitWriter, Code, CodeTable, DecodingTable, FrequencyTable, Node, Symbol,
    header::{read_header, write_header},
};

if_tracing! {
    use tracing::{debug, info, warn};
}

/// Represents an error emitted by the codec while compressing or decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A path argument was empty or only whitespace. No work was performed.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("could not open input file {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("could not create output file {}: {source}", .path.display())]
    Create { path: PathBuf, source: io::Error },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The header claims more frequency records than there are byte values.
    #[error("corrupt header: {0} frequency records claimed, at most 256 allowed")]
    InvalidHeader(u16),

    #[error("corrupt header: input ended inside the frequency table")]
    TruncatedHeader,

    /// The payload ran out before the terminator was decoded.
    #[error("input ended before the end-of-data marker was decoded")]
    UnexpectedEndOfStream,

    #[error("invalid bit {0:?}, only '0' and '1' are allowed")]
    InvalidBit(char),

    /// A symbol had no code. This should (practically) never happen.
    #[error("internal codec error: no code for symbol {0}")]
    MissingCode(Symbol),
}

pub type Result<T, E = CodecError> = core::result::Result<T, E>;

/// Byte counts of one finished codec operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CodecStats {
    /// Bytes consumed from the input, counting the second pass of compression once.
    pub bytes_in: u64,
    pub bytes_out: u64,
    /// Byte symbols coded, not counting the terminator.
    pub symbols: u64,
}

impl CodecStats {
    /// `bytes_out / bytes_in`, or 0 for an empty input.
    pub fn ratio(&self) -> f64 {
        if self.bytes_in == 0 {
            return 0.0;
        }
        self.bytes_out as f64 / self.bytes_in as f64
    }
}

/// Shared behavior for whole-stream codecs.
///
/// Implementors provide the stream operations. The path based entry points, the in-memory helpers
/// and the round-trip check are built on top of them.
pub trait Codec {
    /// Compresses all of `input` into `output`. The input is read twice, hence `Seek`.
    fn compress_stream<R: Read + Seek, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<CodecStats>;

    /// Decodes a compressed stream produced by [`compress_stream`](Codec::compress_stream).
    ///
    /// # Errors
    ///
    /// Returns an error if the header is corrupt or the payload ends before the terminator.
    fn decode_stream<R: Read, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<CodecStats>;

    /// Compresses the file at `input_path` into `output_path`, overwriting it if it exists.
    fn compress(&mut self, input_path: impl AsRef<Path>, output_path: impl AsRef<Path>) -> Result<CodecStats> {
        let (input_path, output_path) = (input_path.as_ref(), output_path.as_ref());
        check_path(input_path, "input path must not be empty")?;
        check_path(output_path, "output path must not be empty")?;

        let mut input = open_input(input_path)?;
        let mut output = create_output(output_path)?;
        let stats = self.compress_stream(&mut input, &mut output)?;
        output.flush()?;
        Ok(stats)
    }

    /// Decodes the file at `input_path` into `output_path`, overwriting it if it exists.
    ///
    /// A failure while decoding leaves the partially written output in place.
    fn decode(&mut self, input_path: impl AsRef<Path>, output_path: impl AsRef<Path>) -> Result<CodecStats> {
        let (input_path, output_path) = (input_path.as_ref(), output_path.as_ref());
        check_path(input_path, "input path must not be empty")?;
        check_path(output_path, "output path must not be empty")?;

        let mut input = open_input(input_path)?;
        let mut output = create_output(output_path)?;
        let stats = self.decode_stream(&mut input, &mut output)?;
        output.flush()?;
        Ok(stats)
    }

    fn compress_bytes(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.compress_stream(&mut io::Cursor::new(data), &mut out)?;
        Ok(out)
    }

    fn decompress_bytes(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.decode_stream(&mut &data[..], &mut out)?;
        Ok(out)
    }

    /// Performs a round-trip test on the codec.
    ///
    /// Use for sanity checking the compressor and decompressor.
    fn test_roundtrip<'orig>(&mut self, data: &'orig [u8]) -> Result<RoundTripTestResult<'orig>> {
        let compressed = self.compress_bytes(data)?;
        let decompressed = self.decompress_bytes(&compressed)?;
        let equal = data == decompressed.as_slice();

        Ok(RoundTripTestResult {
            equal,
            original: data,
            compressed,
            decompressed,
        })
    }
}

/// Represents the result of a round-trip test.
#[derive(Clone, Debug, Hash)]
pub struct RoundTripTestResult<'orig> {
    pub(crate) equal: bool,
    pub(crate) original: &'orig [u8],
    pub(crate) compressed: Vec<u8>,
    pub(crate) decompressed: Vec<u8>,
}

impl<'orig> RoundTripTestResult<'orig> {
    /// Whether the original and decompressed data were equal.
    pub const fn is_successful(&self) -> bool {
        self.equal
    }

    pub const fn get_original(&self) -> &'orig [u8] {
        self.original
    }

    pub fn get_compressed(&self) -> &[u8] {
        self.compressed.as_slice()
    }

    pub fn get_decompressed(&self) -> &[u8] {
        self.decompressed.as_slice()
    }
}

/// Static Huffman coding over bytes, with the frequency table stored in front of the payload.
#[derive(Clone, Copy, Debug, Default)]
pub struct HuffmanCodec;

impl Codec for HuffmanCodec {
    fn compress_stream<R: Read + Seek, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<CodecStats> {
        if_tracing! {
            let span = tracing::span!(tracing::Level::INFO, "codec", op = "compress");
            let _enter = span.enter();
        }

        stage(Stage::ScanningFrequencies);
        let start = input.stream_position()?;
        let mut frequencies = FrequencyTable::new();
        let bytes_in = frequencies.count_from(&mut *input)?;

        let session = CodecSession::new(frequencies);

        stage(Stage::WritingHeader);
        let mut bytes_out = write_header(&session.frequencies, output)?;

        stage(Stage::EncodingPayload);
        input.seek(SeekFrom::Start(start))?;
        let mut writer = BitWriter::new(&mut *output);
        let mut symbols = 0u64;
        for byte in BufReader::new(&mut *input).bytes() {
            writer.write_bits(session.code(Symbol::Byte(byte?))?)?;
            symbols += 1;
        }
        writer.write_bits(session.code(Symbol::Terminator)?)?;
        let (_, payload_len) = writer.finish()?;
        bytes_out += payload_len;

        stage(Stage::Done);
        let stats = CodecStats {
            bytes_in,
            bytes_out,
            symbols,
        };
        if_tracing! {
            info!(target = "codec", bytes_in = stats.bytes_in, bytes_out = stats.bytes_out, symbols = stats.symbols, "compress finished");
        }
        Ok(stats)
    }

    fn decode_stream<R: Read, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<CodecStats> {
        if_tracing! {
            let span = tracing::span!(tracing::Level::INFO, "codec", op = "decode");
            let _enter = span.enter();
        }

        stage(Stage::ReadingHeader);
        let mut input = BufReader::new(input);
        let header = read_header(&mut input)?;
        let header_len = header.encoded_len();
        let frequencies = header.frequencies;

        if frequencies.is_empty() {
            if_tracing! {
                debug!(target = "codec", "header is empty, original was empty");
            }
            stage(Stage::Done);
            return Ok(CodecStats {
                bytes_in: header_len,
                ..CodecStats::default()
            });
        }

        let session = CodecSession::new(frequencies);
        let decoding: DecodingTable = session.codes.decoding_table();

        stage(Stage::DecodingPayload);
        let mut output = BufWriter::new(output);
        let mut reader = BitReader::new(&mut input);
        let mut candidate = Code::new();
        let mut bits_read = 0u64;
        let mut symbols = 0u64;
        loop {
            let bit = reader.read_next_bit().inspect_err(|_e| {
                if_tracing! {
                    warn!(target = "codec", error = %_e, symbols, "payload ended early");
                }
            })?;
            bits_read += 1;
            candidate.push(bit);
            match decoding.get(&candidate) {
                Some(Symbol::Terminator) => break,
                Some(&Symbol::Byte(b)) => {
                    output.write_all(&[b])?;
                    symbols += 1;
                    candidate.clear();
                }
                None => {}
            }
        }
        output.flush()?;

        stage(Stage::Done);
        let stats = CodecStats {
            bytes_in: header_len + bits_read.div_ceil(8),
            bytes_out: symbols,
            symbols,
        };
        if_tracing! {
            info!(target = "codec", bytes_in = stats.bytes_in, bytes_out = stats.bytes_out, "decode finished");
        }
        Ok(stats)
    }
}

/// Everything one compress or decode operation derives from its frequency table.
#[derive(Debug)]
pub struct CodecSession {
    pub frequencies: FrequencyTable,
    pub tree: Node,
    pub codes: CodeTable,
}

impl CodecSession {
    /// Builds the tree and the codes for `frequencies`.
    pub fn new(frequencies: FrequencyTable) -> Self {
        stage(Stage::BuildingTree);
        let tree = Node::build(&frequencies);
        stage(Stage::DerivingCodes);
        let codes = CodeTable::derive(&tree);
        debug_assert!(codes.is_prefix_free());
        if_tracing! {
            debug!(target = "codec", symbols = codes.len(), max_code_len = codes.max_len(), "code table ready");
        }
        Self { frequencies, tree, codes }
    }

    fn code(&self, symbol: Symbol) -> Result<&Code> {
        self.codes.get(symbol).ok_or(CodecError::MissingCode(symbol))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    ScanningFrequencies,
    BuildingTree,
    DerivingCodes,
    WritingHeader,
    EncodingPayload,
    ReadingHeader,
    DecodingPayload,
    Done,
}

fn stage(_stage: Stage) {
    if_tracing! {
        debug!(target = "codec", stage = ?_stage, "entering stage");
    }
}

fn check_path(path: &Path, message: &'static str) -> Result<()> {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(CodecError::InvalidArgument(message));
    }
    Ok(())
}

fn open_input(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| CodecError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| CodecError::Create {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_tests() {
        crate::tests::roundtrip_test(HuffmanCodec);
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("small.txt");
        let compressed = dir.path().join("small.txt.huf");
        let inflated = dir.path().join("small.txt.huf.inf");
        let data = b"a baba da babble da dabble babble doo bee babble dabble dooble dee boo".repeat(20);
        fs::write(&original, &data).unwrap();

        let compress_stats = HuffmanCodec.compress(&original, &compressed).unwrap();
        let decode_stats = HuffmanCodec.decode(&compressed, &inflated).unwrap();

        assert_eq!(fs::read(&inflated).unwrap(), data);
        assert_eq!(compress_stats.bytes_in, data.len() as u64);
        assert_eq!(compress_stats.bytes_out, fs::metadata(&compressed).unwrap().len());
        assert!(compress_stats.ratio() < 1.0);
        assert_eq!(decode_stats.bytes_out, data.len() as u64);
        assert_eq!(decode_stats.bytes_in, compress_stats.bytes_out);
    }

    #[test]
    fn empty_file_compresses_to_header_and_one_byte() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("empty.txt");
        let compressed = dir.path().join("empty.huf");
        let inflated = dir.path().join("empty.inf");
        fs::write(&original, b"").unwrap();

        HuffmanCodec.compress(&original, &compressed).unwrap();
        assert_eq!(fs::read(&compressed).unwrap(), vec![0, 0, 0]);

        HuffmanCodec.decode(&compressed, &inflated).unwrap();
        assert_eq!(fs::read(&inflated).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn aaab_payload_bits() {
        let compressed = HuffmanCodec.compress_bytes(b"aaab").unwrap();
        // header: 2 records, then a=1 b=01 terminator=00 -> 1110100 + padding
        assert_eq!(compressed, vec![2, 0, b'a', 3, 0, 0, 0, b'b', 1, 0, 0, 0, 0b1110_1000]);
    }

    #[test]
    fn existing_output_is_overwritten() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("in.bin");
        let compressed = dir.path().join("out.huf");
        fs::write(&original, b"zzzz").unwrap();
        fs::write(&compressed, vec![0xAA; 4096]).unwrap();

        HuffmanCodec.compress(&original, &compressed).unwrap();
        assert_eq!(HuffmanCodec.decompress_bytes(&fs::read(&compressed).unwrap()).unwrap(), b"zzzz");
    }

    #[test]
    fn blank_paths_are_rejected() {
        let dir = tempdir().unwrap();
        let existing = dir.path().join("in.txt");
        fs::write(&existing, b"data").unwrap();

        assert!(matches!(HuffmanCodec.compress("", &existing), Err(CodecError::InvalidArgument(_))));
        assert!(matches!(HuffmanCodec.compress(&existing, "   "), Err(CodecError::InvalidArgument(_))));
        assert!(matches!(HuffmanCodec.decode(" \t", &existing), Err(CodecError::InvalidArgument(_))));
        assert!(matches!(HuffmanCodec.decode(&existing, ""), Err(CodecError::InvalidArgument(_))));
    }

    #[test]
    fn missing_input_is_an_open_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let output = dir.path().join("out");

        assert!(matches!(HuffmanCodec.compress(&missing, &output), Err(CodecError::Open { .. })));
        assert!(matches!(HuffmanCodec.decode(&missing, &output), Err(CodecError::Open { .. })));
        assert!(!output.exists());
    }

    #[test]
    fn uncreatable_output_is_a_create_error() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("in.txt");
        fs::write(&original, b"data").unwrap();
        let output = dir.path().join("no-such-dir").join("out.huf");

        assert!(matches!(HuffmanCodec.compress(&original, &output), Err(CodecError::Create { .. })));
    }

    #[test]
    fn record_count_above_256_is_rejected() {
        let mut data = 300u16.to_le_bytes().to_vec();
        data.extend_from_slice(&[0; 64]);
        assert!(matches!(HuffmanCodec.decompress_bytes(&data), Err(CodecError::InvalidHeader(300))));
    }

    #[test]
    fn truncated_payload_is_reported() {
        let data = b"this payload will be cut short before its terminator".repeat(4);
        let mut compressed = HuffmanCodec.compress_bytes(&data).unwrap();
        let header = crate::huffman::header::header_len(FrequencyTable::from_iter(data.iter().copied()).len()) as usize;
        compressed.truncate(header + (compressed.len() - header) / 2);

        assert!(matches!(HuffmanCodec.decompress_bytes(&compressed), Err(CodecError::UnexpectedEndOfStream)));
    }

    #[test]
    fn header_without_payload_is_reported() {
        let mut compressed = HuffmanCodec.compress_bytes(b"ab").unwrap();
        compressed.truncate(2 + 2 * 5);
        assert!(matches!(HuffmanCodec.decompress_bytes(&compressed), Err(CodecError::UnexpectedEndOfStream)));
    }

    #[test]
    fn zero_frequency_records_decode_to_empty_output() {
        let data = [1u8, 0, b'a', 0, 0, 0, 0];
        assert_eq!(HuffmanCodec.decompress_bytes(&data).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn decoded_input_length_counts_every_header_record() {
        // 'a' recorded with zero frequency, 'b' recorded twice; only b=1 survives
        let mut data = vec![3u8, 0, b'a', 0, 0, 0, 0, b'b', 9, 0, 0, 0, b'b', 1, 0, 0, 0];
        let header_len = data.len() as u64;
        // b=1, terminator=0, one padding byte
        data.push(0b1000_0000);

        let mut out = Vec::new();
        let stats = HuffmanCodec.decode_stream(&mut &data[..], &mut out).unwrap();
        assert_eq!(out, b"b");
        assert_eq!(stats.bytes_in, header_len + 1);
        assert_eq!(stats.bytes_in, data.len() as u64);
    }

    #[test]
    fn zero_frequency_header_reports_its_full_length() {
        let data = [2u8, 0, b'a', 0, 0, 0, 0, b'b', 0, 0, 0, 0];
        let mut out = Vec::new();
        let stats = HuffmanCodec.decode_stream(&mut &data[..], &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(stats.bytes_in, data.len() as u64);
    }

    #[test]
    fn session_codes_match_between_compress_and_decode() {
        let data = b"determinism matters: same table, same tree, same codes";
        let compressed = HuffmanCodec.compress_bytes(data).unwrap();

        let scanned = CodecSession::new(data.iter().copied().collect());
        let persisted = CodecSession::new(read_header(&mut &compressed[..]).unwrap().frequencies);
        assert_eq!(scanned.codes, persisted.codes);
        assert_eq!(scanned.tree, persisted.tree);
        assert!(persisted.codes.is_prefix_free());
    }
}
