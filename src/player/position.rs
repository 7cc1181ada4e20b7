//! Block position reporting

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// Position on the tape in logical data blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BlockPosition {
    /// Block currently playing (or about to play)
    pub current_block: usize,
    /// Number of data blocks on the tape
    pub total_blocks: usize,
    /// Block a fast-forward would reach; clamped to the last block
    pub next_block: usize,
}

impl BlockPosition {
    /// Position at `current_block` on a tape of `total_blocks` blocks
    pub fn new(current_block: usize, total_blocks: usize) -> Self {
        BlockPosition {
            current_block,
            total_blocks,
            next_block: (current_block + 1).min(total_blocks.saturating_sub(1)),
        }
    }
}

/// Receives block positions published by the player
pub trait PositionObserver {
    /// Latest position; replaces whatever was published before
    fn publish(&self, position: BlockPosition);
}

impl<F: Fn(BlockPosition)> PositionObserver for F {
    fn publish(&self, position: BlockPosition) {
        self(position)
    }
}

/// Shared cell holding the most recent position
#[derive(Debug, Clone, Default)]
pub struct SharedPosition {
    inner: Arc<Mutex<BlockPosition>>,
}

impl SharedPosition {
    /// Create a cell at block 0 of an empty tape
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the latest published position
    pub fn get(&self) -> BlockPosition {
        *self.inner.lock()
    }
}

impl PositionObserver for SharedPosition {
    fn publish(&self, position: BlockPosition) {
        *self.inner.lock() = position;
    }
}
