use std::{
    fs::File,
    io::{BufReader, Read},
};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    cli::InspectArgs,
    codec::CodecSession,
    huffman::{Symbol, header},
};

#[derive(Debug, Serialize)]
pub struct InspectReport {
    /// Records stored in the header, including zero-frequency and repeated ones.
    pub records: u16,
    pub header_len: u64,
    /// Leaves of the rebuilt tree: every counted byte plus the terminator.
    pub leaves: usize,
    /// Total symbol count the frequencies describe. Equals the original size unless the counts
    /// were rebased while compressing.
    pub counted_bytes: u64,
    pub payload_bits: u64,
    pub payload_len: u64,
    pub max_code_len: usize,
    pub symbols: Vec<SymbolReport>,
}

#[derive(Debug, Serialize)]
pub struct SymbolReport {
    pub symbol: Symbol,
    pub frequency: u32,
    pub code: String,
}

pub fn inspect(args: InspectArgs) -> Result<()> {
    let file = File::open(&args.input).with_context(|| format!("failed to open {}", args.input.display()))?;
    let report = build_report(&mut BufReader::new(file))
        .with_context(|| format!("failed to read header of {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "records: {}\nheader: {} bytes\nleaves: {}\ncounted bytes: {}\npayload: {} bits ({} bytes)\nlongest code: {} bits\n",
        report.records,
        report.header_len,
        report.leaves,
        report.counted_bytes,
        report.payload_bits,
        report.payload_len,
        report.max_code_len
    );
    for entry in &report.symbols {
        println!("{:<12} {:>12} {}", entry.symbol.to_string(), entry.frequency, entry.code);
    }
    Ok(())
}

/// Reads the header from `reader` and describes the code it implies.
pub fn build_report<R: Read>(reader: &mut R) -> Result<InspectReport> {
    let header = header::read_header(reader)?;
    let header_len = header.encoded_len();
    let session = CodecSession::new(header.frequencies);

    let payload_bits = session.codes.weighted_len(&session.frequencies);
    let symbols = session
        .codes
        .iter()
        .map(|(symbol, code)| SymbolReport {
            symbol,
            frequency: match symbol {
                Symbol::Byte(b) => session.frequencies.get(b),
                Symbol::Terminator => 0,
            },
            code: code.to_string(),
        })
        .collect();

    Ok(InspectReport {
        records: header.records,
        header_len,
        leaves: session.tree.leaf_count(),
        counted_bytes: session.frequencies.total(),
        payload_bits,
        payload_len: payload_bits.div_ceil(8).max(1),
        max_code_len: session.codes.max_len(),
        symbols,
    })
}
