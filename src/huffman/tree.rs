use core::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::huffman::{FrequencyTable, Symbol};

/// A node of the Huffman tree. Leaves carry a symbol, internal nodes carry exactly two children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: Symbol,
        weight: u64,
    },
    Internal {
        left: Box<Node>,
        right: Box<Node>,
        weight: u64,
    },
}

impl Node {
    pub const fn weight(&self) -> u64 {
        match self {
            Self::Leaf { weight, .. } | Self::Internal { weight, .. } => *weight,
        }
    }

    /// Number of leaves below (and including) this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Builds the tree for `frequencies`.
    ///
    /// Every byte with a non-zero frequency gets a leaf, inserted in ascending byte order,
    /// followed by a zero-weight leaf for [`Symbol::Terminator`]. The two lightest nodes are
    /// merged until one remains; equal weights are taken in insertion order, so the same table
    /// always yields the same tree.
    pub fn build(frequencies: &FrequencyTable) -> Self {
        let mut queue = MergeQueue::default();
        for (byte, frequency) in frequencies.entries() {
            queue.push(Self::Leaf {
                symbol: Symbol::Byte(byte),
                weight: frequency as u64,
            });
        }
        queue.push(Self::Leaf {
            symbol: Symbol::Terminator,
            weight: 0,
        });

        while queue.len() > 1 {
            if let (Some(first), Some(second)) = (queue.pop(), queue.pop()) {
                queue.push(Self::Internal {
                    weight: first.weight() + second.weight(),
                    left: Box::new(first),
                    right: Box::new(second),
                });
            }
        }

        queue.pop().unwrap_or(Self::Leaf {
            symbol: Symbol::Terminator,
            weight: 0,
        })
    }
}

/// Min-queue over nodes keyed by `(weight, insertion sequence)`.
#[derive(Default)]
struct MergeQueue {
    heap: BinaryHeap<Reverse<QueueEntry>>,
    next_seq: u64,
}

impl MergeQueue {
    fn push(&mut self, node: Node) {
        let entry = QueueEntry {
            weight: node.weight(),
            seq: self.next_seq,
            node,
        };
        self.next_seq += 1;
        self.heap.push(Reverse(entry));
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn pop(&mut self) -> Option<Node> {
        self.heap.pop().map(|Reverse(entry)| entry.node)
    }
}

struct QueueEntry {
    weight: u64,
    seq: u64,
    node: Node,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.weight, self.seq).cmp(&(other.weight, other.seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(symbol: Symbol, weight: u64) -> Box<Node> {
        Box::new(Node::Leaf { symbol, weight })
    }

    #[test]
    fn empty_table_builds_terminator_leaf() {
        let tree = Node::build(&FrequencyTable::new());
        assert_eq!(
            tree,
            Node::Leaf {
                symbol: Symbol::Terminator,
                weight: 0
            }
        );
    }

    #[test]
    fn aaab_merges_terminator_and_b_first() {
        let table: FrequencyTable = b"aaab".iter().copied().collect();
        let tree = Node::build(&table);

        let expected = Node::Internal {
            left: Box::new(Node::Internal {
                left: leaf(Symbol::Terminator, 0),
                right: leaf(Symbol::Byte(b'b'), 1),
                weight: 1,
            }),
            right: leaf(Symbol::Byte(b'a'), 3),
            weight: 4,
        };
        assert_eq!(tree, expected);
    }

    #[test]
    fn single_symbol_pairs_with_terminator() {
        let table: FrequencyTable = b"zzzz".iter().copied().collect();
        let tree = Node::build(&table);

        assert!(matches!(tree, Node::Internal { .. }));
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.weight(), 4);
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let mut table = FrequencyTable::new();
        table.set(b'c', 5);
        table.set(b'a', 5);
        let tree = Node::build(&table);

        // terminator merges with 'a' (inserted before 'c'), then 'c' (older) is dequeued
        // ahead of the equally weighted internal node.
        let expected = Node::Internal {
            left: leaf(Symbol::Byte(b'c'), 5),
            right: Box::new(Node::Internal {
                left: leaf(Symbol::Terminator, 0),
                right: leaf(Symbol::Byte(b'a'), 5),
                weight: 5,
            }),
            weight: 10,
        };
        assert_eq!(tree, expected);
    }

    #[test]
    fn building_twice_is_identical() {
        let table: FrequencyTable = b"a baba da babble da dabble babble doo bee".iter().copied().collect();
        assert_eq!(Node::build(&table), Node::build(&table));
    }

    #[test]
    fn full_alphabet_at_max_frequency_does_not_overflow() {
        let mut table = FrequencyTable::new();
        for b in 0..=u8::MAX {
            table.set(b, u32::MAX);
        }
        let tree = Node::build(&table);

        assert_eq!(tree.leaf_count(), 257);
        assert_eq!(tree.weight(), 256 * u32::MAX as u64);
    }
}
