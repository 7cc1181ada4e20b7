//! Data Block Numbering
//!
//! Logical block numbers are the 0-based rank of each data-block chunk among
//! all data-block chunks. They have nothing to do with raw chunk positions:
//! a tape with a leading carrier has block 0 at chunk 1.

use crate::uef_parser::Chunk;

/// Ordered chunk positions of every data block in a tape
///
/// Positions are strictly increasing. Built once per session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockIndex {
    positions: Vec<usize>,
}

impl BlockIndex {
    /// Scan the chunk sequence and record the data-block positions
    pub fn build(chunks: &[Chunk]) -> Self {
        let positions = chunks
            .iter()
            .enumerate()
            .filter(|(_, chunk)| chunk.is_data_block())
            .map(|(position, _)| position)
            .collect();
        BlockIndex { positions }
    }

    /// Total number of logical data blocks
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when the tape contains no data blocks
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Chunk position of logical block `block`
    pub fn chunk_index(&self, block: usize) -> Option<usize> {
        self.positions.get(block).copied()
    }

    /// Logical block number of the chunk at `chunk_index`, if it is a data block
    pub fn block_for_chunk(&self, chunk_index: usize) -> Option<usize> {
        self.positions.binary_search(&chunk_index).ok()
    }

    /// All data-block chunk positions in order
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tape(ids: &[u16]) -> Vec<Chunk> {
        ids.iter().map(|&id| Chunk::new(id, vec![0, 0])).collect()
    }

    #[test]
    fn test_ranks_ignore_other_chunks() {
        let chunks = tape(&[0x0110, 0x0100, 0x0112, 0x0110, 0x0104, 0x0100, 0x0116]);
        let index = BlockIndex::build(&chunks);
        assert_eq!(index.positions(), &[1, 4, 5]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.chunk_index(0), Some(1));
        assert_eq!(index.chunk_index(2), Some(5));
        assert_eq!(index.chunk_index(3), None);
    }

    #[test]
    fn test_strictly_increasing() {
        let chunks = tape(&[0x0100, 0x0100, 0x0110, 0x0100, 0x0104, 0x0104]);
        let index = BlockIndex::build(&chunks);
        assert!(index.positions().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_block_lookup() {
        let chunks = tape(&[0x0110, 0x0100, 0x0112, 0x0100]);
        let index = BlockIndex::build(&chunks);
        assert_eq!(index.block_for_chunk(1), Some(0));
        assert_eq!(index.block_for_chunk(3), Some(1));
        assert_eq!(index.block_for_chunk(2), None);
    }

    #[test]
    fn test_empty_tape() {
        let index = BlockIndex::build(&tape(&[0x0110, 0x0112]));
        assert!(index.is_empty());
        assert_eq!(index.chunk_index(0), None);
    }
}
