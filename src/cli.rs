//! cli component of huffpack.
//!
//! lines starting with `> ` denote valid invocations. `$exename` stands for the executable name,
//! `<description>` denotes a required argument, `[description]` an optional one.
//!
//! # Compression
//!
//! > `$exename compress <input file> <output file>`
//!
//! the input is read twice: once to count byte frequencies, once to encode. the output starts with
//! the frequency table, so the decoder needs nothing but the compressed file. an existing output
//! file is overwritten.
//!
//! # Decompression
//!
//! > `$exename decode <compressed file> <output file>`
//!
//! `inflate` is accepted as an alias. a corrupt header or a payload that ends before the
//! end-of-data marker aborts with an error; whatever was decoded up to that point stays in the
//! output file.
//!
//! # Testing
//!
//! > `$exename test <input file> [--save-failures]`
//!
//! compresses the file in memory, decodes it again and compares the result with the original.
//! sizes, ratio and timings are printed. with `--save-failures`, a mismatch writes
//! `{file name}.expected.bin` and `{file name}.got.bin` to the working directory.
//!
//! # Inspection
//!
//! > `$exename inspect <compressed file> [--json]`
//!
//! reads only the header of a compressed file, rebuilds the code table and prints every symbol
//! with its frequency and code, plus the payload size the header implies.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod compress;
pub mod decode;
pub mod inspect;

/// CLI arguments for the huffpack application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Supported commands for huffpack
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compress a file
    #[command(visible_alias = "enc", alias = "c")]
    Compress(CompressArgs),

    /// Decode (inflate) a compressed file
    #[command(visible_alias = "inflate", alias = "dec", alias = "d")]
    Decode(DecodeArgs),

    /// Test compression/decompression roundtrip on a file
    Test(TestArgs),

    /// Print the frequency table and codes stored in a compressed file
    Inspect(InspectArgs),
}

/// Arguments specific to the compress command
#[derive(Args, Debug)]
pub struct CompressArgs {
    /// Path to the input file
    pub input: PathBuf,

    /// Path for the compressed output file
    pub output: PathBuf,
}

/// Arguments specific to the decode command
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Path to the compressed file
    pub input: PathBuf,

    /// Path for the decoded output file
    pub output: PathBuf,
}

/// Arguments specific to the test command
#[derive(Args, Debug)]
pub struct TestArgs {
    /// Path to the file to roundtrip
    pub input: PathBuf,

    /// Write the expected and decoded bytes next to the working directory on mismatch
    #[arg(long)]
    pub save_failures: bool,
}

/// Arguments specific to the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the compressed file
    pub input: PathBuf,

    /// Emit the report as JSON
    #[arg(long)]
    pub json: bool,
}
