//! Leaf components of the Huffman codec: symbols, frequency accounting, bit-level I/O,
//! tree construction, code derivation and the persisted frequency header.

use core::fmt;

use serde::Serialize;

pub mod bitio;
pub mod code_table;
pub mod frequency;
pub mod header;
pub mod tree;

pub use self::bitio::{BitReader, BitWriter};
pub use self::code_table::{Code, CodeTable, DecodingTable};
pub use self::frequency::FrequencyTable;
pub use self::tree::Node;

/// An entry of the coding alphabet: every byte value plus one end-of-payload marker.
///
/// The terminator lives outside the byte range, so it can never be confused with real data.
/// Ordering places all bytes (ascending) before the terminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    Byte(u8),
    Terminator,
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(b) if b.is_ascii_graphic() => write!(f, "{:#04x} '{}'", b, *b as char),
            Self::Byte(b) => write!(f, "{:#04x}", b),
            Self::Terminator => write!(f, "<end>"),
        }
    }
}
