use core::fmt;
use core::str::FromStr;
use std::collections::{BTreeMap, HashMap};

use crate::codec::CodecError;
use crate::huffman::{FrequencyTable, Node, Symbol};

/// A codeword: the sequence of edge labels from the root to a leaf, `false` for left.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Code {
    bits: Vec<bool>,
}

impl Code {
    pub const fn new() -> Self {
        Self { bits: Vec::new() }
    }

    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    pub fn pop(&mut self) -> Option<bool> {
        self.bits.pop()
    }

    pub fn clear(&mut self) {
        self.bits.clear();
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    pub fn starts_with(&self, prefix: &Code) -> bool {
        self.bits.starts_with(&prefix.bits)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for Code {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(CodecError::InvalidBit(other)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|bits| Self { bits })
    }
}

/// Symbol to codeword mapping derived from a Huffman tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<Symbol, Code>,
}

/// Inverse of a [`CodeTable`], used by the decoder to look up accumulated bit strings.
pub type DecodingTable = HashMap<Code, Symbol>;

impl CodeTable {
    /// Derives one code per leaf with a depth-first walk of `root`.
    ///
    /// A single-leaf tree gets the empty code.
    pub fn derive(root: &Node) -> Self {
        let mut codes = BTreeMap::new();
        let mut path = Code::new();
        walk(root, &mut path, &mut codes);
        Self { codes }
    }

    pub fn get(&self, symbol: Symbol) -> Option<&Code> {
        self.codes.get(&symbol)
    }

    /// Codes in symbol order: bytes ascending, then the terminator.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &Code)> + '_ {
        self.codes.iter().map(|(s, c)| (*s, c))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn max_len(&self) -> usize {
        self.codes.values().map(Code::len).max().unwrap_or(0)
    }

    /// Whether no code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        let codes: Vec<&Code> = self.codes.values().collect();
        codes.iter().enumerate().all(|(i, a)| {
            codes
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || !b.starts_with(a))
        })
    }

    /// Total payload bits needed to code every byte counted in `frequencies` plus the terminator.
    pub fn weighted_len(&self, frequencies: &FrequencyTable) -> u64 {
        let bytes: u64 = frequencies
            .entries()
            .map(|(b, f)| f as u64 * self.get(Symbol::Byte(b)).map_or(0, Code::len) as u64)
            .sum();
        bytes + self.get(Symbol::Terminator).map_or(0, Code::len) as u64
    }

    pub fn decoding_table(&self) -> DecodingTable {
        self.codes.iter().map(|(s, c)| (c.clone(), *s)).collect()
    }
}

fn walk(node: &Node, path: &mut Code, codes: &mut BTreeMap<Symbol, Code>) {
    match node {
        Node::Leaf { symbol, .. } => {
            codes.insert(*symbol, path.clone());
        }
        Node::Internal { left, right, .. } => {
            path.push(false);
            walk(left, path, codes);
            path.pop();
            path.push(true);
            walk(right, path, codes);
            path.pop();
        }
    }
}
